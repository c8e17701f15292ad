// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Default-biased debouncing of raw sensor bits.
//!
//! Raw discrete inputs flicker: a tote sliding into a bay bounces the
//! sensor, and a half-covered reflector can oscillate for seconds. The
//! [`Debouncer`] therefore only leaves a site's default state after the
//! raw bit has disagreed with it for an uninterrupted window, while any
//! sample that agrees with the default snaps the site back immediately.
//!
//! All uncertainty is biased toward the per-site safe state: a pick
//! location (default empty) needs sustained evidence of presence before
//! work is admitted, a drop location (default filled) needs sustained
//! evidence of free space before a drop is admitted.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

use crate::types::{LogicalState, Site};

// =============================================================================
// Debouncer
// =============================================================================

/// Per-site hysteresis state machine.
///
/// State entries are created lazily on the first sample and removed by
/// [`reset`](Debouncer::reset), so after any Modbus failure the next
/// sample starts fresh from the site's default.
#[derive(Debug)]
pub struct Debouncer {
    /// Required uninterrupted disagreement window.
    window: Duration,
    /// Runtime state keyed by site id.
    states: HashMap<String, DebounceState>,
}

#[derive(Debug)]
struct DebounceState {
    /// When the current run of opposite-to-default samples began.
    opposite_since: Option<Instant>,
    /// The currently published logical state.
    effective: LogicalState,
}

impl Debouncer {
    /// Creates a debouncer with the given disagreement window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            states: HashMap::new(),
        }
    }

    /// Feeds one raw sample and returns the state to publish.
    ///
    /// A sample equal to the default bit clears any pending transition and
    /// returns the default. An opposite sample arms the transition timer
    /// on first sight and flips the effective state once `now` is at
    /// least one full window past the arming instant. The boundary sample
    /// exactly at the window is accepted.
    pub fn update(&mut self, site: &Site, raw_bit: bool, now: Instant) -> LogicalState {
        let default_bit = site.default.as_bit();
        let state = self
            .states
            .entry(site.site_id.clone())
            .or_insert(DebounceState {
                opposite_since: None,
                effective: site.default,
            });

        if raw_bit == default_bit {
            state.opposite_since = None;
            state.effective = site.default;
        } else {
            match state.opposite_since {
                None => state.opposite_since = Some(now),
                Some(since) if now.duration_since(since) >= self.window => {
                    state.effective = site.default.opposite();
                }
                Some(_) => {}
            }
        }

        state.effective
    }

    /// Drops a site's state so the next sample starts from its default.
    pub fn reset(&mut self, site_id: &str) {
        self.states.remove(site_id);
    }

    /// Whether a transition timer is currently armed for the site.
    pub fn is_armed(&self, site_id: &str) -> bool {
        self.states
            .get(site_id)
            .map(|s| s.opposite_since.is_some())
            .unwrap_or(false)
    }

    /// Number of sites with live state, for diagnostics.
    pub fn tracked_sites(&self) -> usize {
        self.states.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(2000);

    fn pick_site() -> Site {
        Site {
            site_id: "PICK-01".to_string(),
            host: "plc-a".to_string(),
            port: 502,
            unit_id: 1,
            offset: 10,
            default: LogicalState::Empty,
        }
    }

    fn drop_site() -> Site {
        Site {
            default: LogicalState::Filled,
            site_id: "DROP-01".to_string(),
            ..pick_site()
        }
    }

    #[test]
    fn test_agreeing_samples_stay_default() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        for step in 0..3u64 {
            let now = t0 + Duration::from_millis(step * 500);
            assert_eq!(deb.update(&site, false, now), LogicalState::Empty);
        }
        assert!(!deb.is_armed("PICK-01"));
    }

    #[test]
    fn test_transition_after_full_window() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        // false, then true every 500 ms: the timer arms at t=500 and the
        // flip lands on the first sample at least 2000 ms later.
        let samples = [false, true, true, true, true, true, true];
        let expected = [
            LogicalState::Empty,
            LogicalState::Empty,
            LogicalState::Empty,
            LogicalState::Empty,
            LogicalState::Empty,
            LogicalState::Filled,
            LogicalState::Filled,
        ];

        for (step, (&raw, &want)) in samples.iter().zip(expected.iter()).enumerate() {
            let now = t0 + Duration::from_millis(step as u64 * 500);
            assert_eq!(deb.update(&site, raw, now), want, "step {}", step);
        }
    }

    #[test]
    fn test_boundary_sample_is_accepted() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        assert_eq!(deb.update(&site, true, t0), LogicalState::Empty);
        // Strictly inside the window: still default.
        assert_eq!(
            deb.update(&site, true, t0 + WINDOW - Duration::from_millis(1)),
            LogicalState::Empty
        );
        // Exactly at the window: accepted.
        assert_eq!(deb.update(&site, true, t0 + WINDOW), LogicalState::Filled);
    }

    #[test]
    fn test_glitch_snaps_back() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        let samples = [false, true, false, true, true];
        for (step, &raw) in samples.iter().enumerate() {
            let now = t0 + Duration::from_millis(step as u64 * 500);
            assert_eq!(deb.update(&site, raw, now), LogicalState::Empty, "step {}", step);
        }
        // Re-armed at step 3, nowhere near the window.
        assert!(deb.is_armed("PICK-01"));
    }

    #[test]
    fn test_drop_site_biases_toward_filled() {
        let mut deb = Debouncer::new(WINDOW);
        let site = drop_site();
        let t0 = Instant::now();

        // Raw true agrees with the filled default.
        assert_eq!(deb.update(&site, true, t0), LogicalState::Filled);
        // Raw false needs the full window before the site reads empty.
        assert_eq!(
            deb.update(&site, false, t0 + Duration::from_millis(500)),
            LogicalState::Filled
        );
        assert_eq!(
            deb.update(&site, false, t0 + Duration::from_millis(500) + WINDOW),
            LogicalState::Empty
        );
    }

    #[test]
    fn test_flipped_state_stays_until_agreement() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        deb.update(&site, true, t0);
        assert_eq!(deb.update(&site, true, t0 + WINDOW), LogicalState::Filled);
        // Still disagreeing: stays flipped.
        assert_eq!(
            deb.update(&site, true, t0 + WINDOW + Duration::from_millis(500)),
            LogicalState::Filled
        );
        // One agreeing sample snaps back instantly.
        assert_eq!(
            deb.update(&site, false, t0 + WINDOW + Duration::from_millis(1000)),
            LogicalState::Empty
        );
        assert!(!deb.is_armed("PICK-01"));
    }

    #[test]
    fn test_reset_then_default_sample() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        deb.update(&site, true, t0);
        assert!(deb.is_armed("PICK-01"));

        deb.reset("PICK-01");
        assert_eq!(deb.tracked_sites(), 0);

        assert_eq!(deb.update(&site, false, t0 + WINDOW), LogicalState::Empty);
        assert!(!deb.is_armed("PICK-01"));
    }

    #[test]
    fn test_reset_discards_pending_transition() {
        let mut deb = Debouncer::new(WINDOW);
        let site = pick_site();
        let t0 = Instant::now();

        deb.update(&site, true, t0);
        deb.reset("PICK-01");

        // The window that elapsed before the reset does not count.
        assert_eq!(deb.update(&site, true, t0 + WINDOW), LogicalState::Empty);
        assert_eq!(
            deb.update(&site, true, t0 + WINDOW + WINDOW),
            LogicalState::Filled
        );
    }
}
