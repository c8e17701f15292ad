// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Domain types: logical work-site states, site records and groups.
//!
//! A [`Site`] binds one RDS work-site identifier to one Modbus discrete
//! input. Sites sharing a PLC endpoint (host, port, unit) are collected
//! into a [`Group`] so the whole span of their inputs can be fetched with
//! a single Read Discrete Inputs request.

use serde::{Deserialize, Serialize};

// =============================================================================
// LogicalState
// =============================================================================

/// The logical inventory state of a work-site as seen by the dispatcher.
///
/// Every site also carries one of these as its *default*: the safe state
/// published whenever the sensor cannot be read and the bias of the
/// debouncer. Pick locations default to `Empty`, drop locations to
/// `Filled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalState {
    /// The work-site holds no load.
    Empty,
    /// The work-site holds a load.
    Filled,
}

impl LogicalState {
    /// Maps the state onto the raw sensor convention (`true` = filled).
    pub fn as_bit(self) -> bool {
        matches!(self, LogicalState::Filled)
    }

    /// Builds a state from a raw sensor bit (`true` = filled).
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            LogicalState::Filled
        } else {
            LogicalState::Empty
        }
    }

    /// Returns the other state.
    pub fn opposite(self) -> Self {
        match self {
            LogicalState::Empty => LogicalState::Filled,
            LogicalState::Filled => LogicalState::Empty,
        }
    }

    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalState::Empty => "empty",
            LogicalState::Filled => "filled",
        }
    }
}

impl std::fmt::Display for LogicalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Site
// =============================================================================

/// Static configuration of one work-site, immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// RDS work-site identifier, used verbatim on the wire.
    pub site_id: String,
    /// Hostname or IPv4 address of the PLC gateway.
    pub host: String,
    /// TCP port of the PLC gateway, typically 502.
    pub port: u16,
    /// Modbus unit (slave) identifier.
    pub unit_id: u8,
    /// Discrete-input address whose bit represents this site.
    pub offset: u16,
    /// Safe logical state used during outages and as the debounce bias.
    pub default: LogicalState,
}

impl Site {
    /// The endpoint key shared by all sites of the same group.
    pub fn endpoint_key(&self) -> String {
        format!("{}:{}:{}", self.host, self.port, self.unit_id)
    }
}

// =============================================================================
// Group
// =============================================================================

/// All sites serviced by one Modbus/TCP connection.
///
/// Membership is fixed at startup: every site belongs to exactly one
/// group, keyed by `host:port:unit_id`. The group records the offset
/// bounds of its members so one read request covers them all.
#[derive(Debug, Clone)]
pub struct Group {
    /// Unique key `host:port:unit_id`.
    pub key: String,
    /// Member sites in configuration order. Never empty.
    pub sites: Vec<Site>,
    /// Smallest member offset; the read starts here.
    pub min_offset: u16,
    /// Largest member offset.
    pub max_offset: u16,
}

impl Group {
    /// Groups sites by endpoint, preserving first-appearance order of the
    /// endpoints and configuration order of the sites within each group.
    pub fn build(sites: impl IntoIterator<Item = Site>) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();

        for site in sites {
            let key = site.endpoint_key();
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => {
                    group.min_offset = group.min_offset.min(site.offset);
                    group.max_offset = group.max_offset.max(site.offset);
                    group.sites.push(site);
                }
                None => groups.push(Group {
                    key,
                    min_offset: site.offset,
                    max_offset: site.offset,
                    sites: vec![site],
                }),
            }
        }

        groups
    }

    /// Quantity of discrete inputs to request for this group.
    ///
    /// A single-site group always reads one input, regardless of where its
    /// offset sits.
    pub fn read_length(&self) -> u16 {
        if self.sites.len() == 1 {
            1
        } else {
            self.max_offset - self.min_offset + 1
        }
    }

    /// Index of a site's bit within this group's response.
    pub fn input_index(&self, site: &Site) -> usize {
        usize::from(site.offset - self.min_offset)
    }

    /// Host part of the endpoint.
    pub fn host(&self) -> &str {
        &self.sites[0].host
    }

    /// Port part of the endpoint.
    pub fn port(&self) -> u16 {
        self.sites[0].port
    }

    /// Unit identifier part of the endpoint.
    pub fn unit_id(&self) -> u8 {
        self.sites[0].unit_id
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, host: &str, unit: u8, offset: u16) -> Site {
        Site {
            site_id: id.to_string(),
            host: host.to_string(),
            port: 502,
            unit_id: unit,
            offset,
            default: LogicalState::Empty,
        }
    }

    #[test]
    fn test_logical_state_bits() {
        assert!(LogicalState::Filled.as_bit());
        assert!(!LogicalState::Empty.as_bit());
        assert_eq!(LogicalState::from_bit(true), LogicalState::Filled);
        assert_eq!(LogicalState::from_bit(false), LogicalState::Empty);
        assert_eq!(LogicalState::Empty.opposite(), LogicalState::Filled);
        assert_eq!(LogicalState::Filled.opposite(), LogicalState::Empty);
    }

    #[test]
    fn test_grouping_by_endpoint() {
        let groups = Group::build(vec![
            site("PICK-01", "plc-a", 1, 10),
            site("PICK-02", "plc-a", 1, 12),
            site("DROP-01", "plc-b", 1, 0),
            site("PICK-03", "plc-a", 2, 10),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, "plc-a:502:1");
        assert_eq!(groups[1].key, "plc-b:502:1");
        assert_eq!(groups[2].key, "plc-a:502:2");
        assert_eq!(groups[0].sites.len(), 2);
        assert_eq!(groups[0].min_offset, 10);
        assert_eq!(groups[0].max_offset, 12);
        assert_eq!(groups[0].read_length(), 3);
    }

    #[test]
    fn test_grouping_preserves_order() {
        let groups = Group::build(vec![
            site("B", "plc-a", 1, 20),
            site("A", "plc-a", 1, 5),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sites[0].site_id, "B");
        assert_eq!(groups[0].sites[1].site_id, "A");
        assert_eq!(groups[0].min_offset, 5);
        assert_eq!(groups[0].max_offset, 20);
        assert_eq!(groups[0].read_length(), 16);
    }

    #[test]
    fn test_single_site_reads_length_one() {
        let groups = Group::build(vec![site("LONE", "plc-a", 1, 4711)]);
        assert_eq!(groups[0].read_length(), 1);
        assert_eq!(groups[0].input_index(&groups[0].sites[0]), 0);
    }

    #[test]
    fn test_input_index() {
        let groups = Group::build(vec![
            site("X", "plc-a", 1, 9),
            site("Y", "plc-a", 1, 12),
        ]);
        let g = &groups[0];
        assert_eq!(g.input_index(&g.sites[0]), 0);
        assert_eq!(g.input_index(&g.sites[1]), 3);
    }
}
