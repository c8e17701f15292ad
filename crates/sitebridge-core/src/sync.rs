// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The per-cycle sync engine.
//!
//! One call to [`SyncEngine::sync_once`] performs one poll cycle:
//!
//! 1. Make sure an RDS session exists (failure is logged, not fatal).
//! 2. For every group, read its discrete inputs and branch on the tag:
//!    backoff is silent, a read failure falls back to every site's
//!    default, and a successful read feeds each site's bit through the
//!    debouncer.
//! 3. Publish the resulting state for every handled site.
//!
//! The engine is the error-confining boundary of the daemon: nothing
//! below it may take the process down. Publish failures are logged per
//! site and never abort the cycle. Scheduling (the poll interval, skipped
//! overlaps, shutdown) is owned by the caller.

use tokio::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::debounce::Debouncer;
use crate::publisher::StatePublisher;
use crate::source::{InputSource, ReadOutcome};
use crate::types::{Group, LogicalState};

// =============================================================================
// SyncEngine
// =============================================================================

/// Drives groups, debouncer and publisher through poll cycles.
pub struct SyncEngine<S, P> {
    groups: Vec<Group>,
    debouncer: Debouncer,
    source: S,
    publisher: P,
}

impl<S: InputSource, P: StatePublisher> SyncEngine<S, P> {
    /// Creates an engine over the given groups.
    pub fn new(groups: Vec<Group>, fill_debounce: Duration, source: S, publisher: P) -> Self {
        Self {
            groups,
            debouncer: Debouncer::new(fill_debounce),
            source,
            publisher,
        }
    }

    /// The groups this engine services, in configuration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Read access to the debounce state, for diagnostics.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Runs one poll cycle.
    pub async fn sync_once(&mut self) {
        if let Err(e) = self.publisher.ensure_session().await {
            warn!(error = %e, "RDS session not available, writes will retry login on demand");
        }

        let now = Instant::now();

        for group in &self.groups {
            match self.source.read_group(group).await {
                ReadOutcome::Backoff => {
                    // The dispatcher already holds the safe state from the
                    // failure that armed the backoff; re-writing would be
                    // noise.
                    debug!(group = %group.key, "endpoint in reconnect backoff, skipping");
                }
                ReadOutcome::Failed(reason) => {
                    error!(group = %group.key, error = %reason, "Modbus read failed, falling back to defaults");
                    for site in &group.sites {
                        self.debouncer.reset(&site.site_id);
                        self.publish_state(&site.site_id, site.default).await;
                    }
                }
                ReadOutcome::Inputs(inputs) => {
                    for site in &group.sites {
                        let idx = group.input_index(site);
                        match inputs.get(idx).copied() {
                            Some(raw_bit) => {
                                let effective = self.debouncer.update(site, raw_bit, now);
                                self.publish_state(&site.site_id, effective).await;
                            }
                            None => {
                                error!(
                                    site = %site.site_id,
                                    offset = site.offset,
                                    idx,
                                    "discrete input missing from response, check the configured offsets"
                                );
                                self.debouncer.reset(&site.site_id);
                                self.publish_state(&site.site_id, site.default).await;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Releases all transport resources. Called once on shutdown.
    pub async fn shutdown(&mut self) {
        self.source.close_all().await;
        self.publisher.close().await;
    }

    /// Publishes one site's state, confining any failure to a log line.
    async fn publish_state(&self, site_id: &str, state: LogicalState) {
        debug!(site = %site_id, state = %state, "publishing work-site state");
        if let Err(e) = self.publisher.publish(site_id, state).await {
            error!(site = %site_id, state = %state, error = %e, "work-site write failed");
        }
    }
}
