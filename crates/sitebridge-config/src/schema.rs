// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions.
//!
//! # Schema Structure
//!
//! ```text
//! BridgeConfig
//! ├── rds: RdsConfig
//! ├── poll_interval_ms / modbus_request_timeout_ms
//! ├── reconnect_backoff_ms / fill_debounce_ms
//! ├── debug_log
//! └── sites: Vec<SiteConfig>
//! ```
//!
//! `offset` is unsigned and `default` is a two-variant enum, so a negative
//! address or an unknown state is rejected at the deserialization boundary
//! with an error naming the field. The remaining rules (non-empty ids,
//! uniqueness, non-zero durations) run in [`BridgeConfig::validate`] and
//! fail fast on the first violation.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sitebridge_core::{Group, LogicalState, Site};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default Modbus per-request timeout in milliseconds.
pub const DEFAULT_MODBUS_REQUEST_TIMEOUT_MS: u64 = 1000;

/// Default minimum interval between connect attempts to a failed endpoint.
pub const DEFAULT_RECONNECT_BACKOFF_MS: u64 = 5000;

/// Default debounce window in milliseconds.
pub const DEFAULT_FILL_DEBOUNCE_MS: u64 = 2000;

/// Default RDS request timeout in milliseconds.
pub const DEFAULT_RDS_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Default Modbus TCP port.
pub const DEFAULT_MODBUS_PORT: u16 = 502;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration for the bridge, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Dispatcher connection settings.
    pub rds: RdsConfig,

    /// Poll interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Modbus per-request timeout in milliseconds (also bounds connects).
    #[serde(default = "default_modbus_request_timeout")]
    pub modbus_request_timeout_ms: u64,

    /// Minimum interval between connect attempts to a failed endpoint.
    #[serde(default = "default_reconnect_backoff")]
    pub reconnect_backoff_ms: u64,

    /// Uninterrupted disagreement window before a state change is accepted.
    #[serde(default = "default_fill_debounce")]
    pub fill_debounce_ms: u64,

    /// Gates verbose diagnostic messages; errors are always emitted.
    #[serde(default)]
    pub debug_log: bool,

    /// The configured work-sites.
    pub sites: Vec<SiteConfig>,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_modbus_request_timeout() -> u64 {
    DEFAULT_MODBUS_REQUEST_TIMEOUT_MS
}

fn default_reconnect_backoff() -> u64 {
    DEFAULT_RECONNECT_BACKOFF_MS
}

fn default_fill_debounce() -> u64 {
    DEFAULT_FILL_DEBOUNCE_MS
}

impl BridgeConfig {
    /// Validates the entire configuration, failing fast on the first
    /// violation with an error naming the offending field or site.
    pub fn validate(&self) -> ConfigResult<()> {
        self.rds.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::validation("poll_interval_ms", "cannot be zero"));
        }
        if self.modbus_request_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "modbus_request_timeout_ms",
                "cannot be zero",
            ));
        }
        if self.reconnect_backoff_ms == 0 {
            return Err(ConfigError::validation(
                "reconnect_backoff_ms",
                "cannot be zero",
            ));
        }
        if self.fill_debounce_ms == 0 {
            return Err(ConfigError::validation("fill_debounce_ms", "cannot be zero"));
        }

        if self.sites.is_empty() {
            return Err(ConfigError::validation("sites", "at least one site is required"));
        }

        let mut seen = HashSet::new();
        for (index, site) in self.sites.iter().enumerate() {
            site.validate(index)?;
            if !seen.insert(&site.site_id) {
                return Err(ConfigError::duplicate_site_id(&site.site_id));
            }
        }

        Ok(())
    }

    /// Converts the validated site list into domain values.
    pub fn to_sites(&self) -> Vec<Site> {
        self.sites.iter().map(SiteConfig::to_site).collect()
    }

    /// Derives the per-endpoint groups in configuration order.
    pub fn site_groups(&self) -> Vec<Group> {
        Group::build(self.to_sites())
    }

    /// Poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Modbus request timeout as a Duration.
    pub fn modbus_request_timeout(&self) -> Duration {
        Duration::from_millis(self.modbus_request_timeout_ms)
    }

    /// Reconnect backoff as a Duration.
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    /// Debounce window as a Duration.
    pub fn fill_debounce(&self) -> Duration {
        Duration::from_millis(self.fill_debounce_ms)
    }
}

// =============================================================================
// RDS Configuration
// =============================================================================

/// Connection settings for the dispatch server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RdsConfig {
    /// Base URL of the RDS HTTP API.
    pub host: String,

    /// Login user name.
    pub user: String,

    /// Login password (digested before it goes on the wire).
    pub pass: String,

    /// Value of the `Language` header on every call.
    #[serde(default = "default_language")]
    pub language: String,

    /// Timeout for each RDS HTTP request in milliseconds.
    #[serde(default = "default_rds_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_rds_request_timeout() -> u64 {
    DEFAULT_RDS_REQUEST_TIMEOUT_MS
}

impl RdsConfig {
    /// Validates the RDS settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::validation("rds.host", "cannot be empty"));
        }
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(ConfigError::validation(
                "rds.host",
                "must be an http:// or https:// URL",
            ));
        }
        if self.user.is_empty() {
            return Err(ConfigError::validation("rds.user", "cannot be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "rds.request_timeout_ms",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// =============================================================================
// Site Configuration
// =============================================================================

/// One work-site entry binding an RDS id to a discrete input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// RDS work-site identifier, unique across the list.
    pub site_id: String,

    /// Hostname or IPv4 address of the PLC gateway.
    pub host: String,

    /// TCP port of the PLC gateway.
    #[serde(default = "default_modbus_port")]
    pub port: u16,

    /// Modbus unit (slave) identifier.
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Discrete-input address of this site's bit.
    pub offset: u16,

    /// Safe logical state for this site.
    pub default: LogicalState,
}

fn default_modbus_port() -> u16 {
    DEFAULT_MODBUS_PORT
}

fn default_unit_id() -> u8 {
    1
}

impl SiteConfig {
    /// Validates one site entry. `index` names the entry in errors when
    /// the id itself is unusable.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        if self.site_id.is_empty() {
            return Err(ConfigError::validation(
                format!("sites[{}].site_id", index),
                "cannot be empty",
            ));
        }
        if self.host.is_empty() {
            return Err(ConfigError::validation(
                format!("sites.{}.host", self.site_id),
                "cannot be empty",
            ));
        }
        Ok(())
    }

    /// Converts into the domain value.
    pub fn to_site(&self) -> Site {
        Site {
            site_id: self.site_id.clone(),
            host: self.host.clone(),
            port: self.port,
            unit_id: self.unit_id,
            offset: self.offset,
            default: self.default,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rds() -> RdsConfig {
        RdsConfig {
            host: "http://rds.local:8080".to_string(),
            user: "bridge".to_string(),
            pass: "secret".to_string(),
            language: default_language(),
            request_timeout_ms: default_rds_request_timeout(),
        }
    }

    fn site(id: &str, host: &str, offset: u16) -> SiteConfig {
        SiteConfig {
            site_id: id.to_string(),
            host: host.to_string(),
            port: 502,
            unit_id: 1,
            offset,
            default: LogicalState::Empty,
        }
    }

    fn config(sites: Vec<SiteConfig>) -> BridgeConfig {
        BridgeConfig {
            rds: rds(),
            poll_interval_ms: default_poll_interval(),
            modbus_request_timeout_ms: default_modbus_request_timeout(),
            reconnect_backoff_ms: default_reconnect_backoff(),
            fill_debounce_ms: default_fill_debounce(),
            debug_log: false,
            sites,
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![site("PICK-01", "plc-a", 10)]);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
        assert_eq!(cfg.fill_debounce(), Duration::from_millis(2000));
    }

    #[test]
    fn test_empty_site_id_rejected() {
        let cfg = config(vec![site("", "plc-a", 10)]);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sites[0].site_id"));
    }

    #[test]
    fn test_duplicate_site_id_rejected() {
        let cfg = config(vec![
            site("PICK-01", "plc-a", 10),
            site("PICK-01", "plc-b", 11),
        ]);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSiteId { .. }));
        assert!(err.to_string().contains("PICK-01"));
    }

    #[test]
    fn test_empty_site_list_rejected() {
        let cfg = config(vec![]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut cfg = config(vec![site("PICK-01", "plc-a", 10)]);
        cfg.poll_interval_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config(vec![site("PICK-01", "plc-a", 10)]);
        cfg.fill_debounce_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rds_host_must_be_url() {
        let mut cfg = config(vec![site("PICK-01", "plc-a", 10)]);
        cfg.rds.host = "rds.local:8080".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("rds.host"));
    }

    #[test]
    fn test_site_groups_derivation() {
        let cfg = config(vec![
            site("PICK-01", "plc-a", 10),
            site("PICK-02", "plc-a", 12),
            site("DROP-01", "plc-b", 3),
        ]);
        let groups = cfg.site_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "plc-a:502:1");
        assert_eq!(groups[0].read_length(), 3);
        assert_eq!(groups[1].read_length(), 1);
    }

    #[test]
    fn test_default_deserializes_lowercase() {
        let yaml_site: SiteConfig = serde_json::from_str(
            r#"{"site_id":"D1","host":"plc","offset":4,"default":"filled"}"#,
        )
        .unwrap();
        assert_eq!(yaml_site.default, LogicalState::Filled);
        assert_eq!(yaml_site.port, DEFAULT_MODBUS_PORT);
        assert_eq!(yaml_site.unit_id, 1);
    }
}
