// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and resolve `${VAR}` / `${VAR:default}` placeholders
//! 2. Parse YAML, TOML or JSON depending on the file extension
//! 3. Apply `SITEBRIDGE_*` environment variable overrides
//! 4. Validate and return the final [`BridgeConfig`]
//!
//! The pipeline runs exactly once at startup; any failure is fatal.

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::BridgeConfig;

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads and validates bridge configuration files.
///
/// # Examples
///
/// ```no_run
/// use sitebridge_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("sitebridge.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix for overrides.
    env_prefix: String,
    /// Whether to resolve `${VAR}` placeholders and apply overrides.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: "SITEBRIDGE".to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable handling.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is determined by the extension: `.yaml`/`.yml`, `.toml`
    /// or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<BridgeConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let config = self
            .parse_content(&content, format)
            .map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::parse(path, message),
                other => other,
            })?;

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            "Loaded {} sites across {} Modbus endpoints",
            config.sites.len(),
            config.site_groups().len()
        );

        Ok(config)
    }

    /// Loads configuration from a string with the given format.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<BridgeConfig> {
        let config = self.parse_content(content, format)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(&self, content: &str, format: ConfigFormat) -> ConfigResult<BridgeConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = self.parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        Ok(config)
    }

    fn parse_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<BridgeConfig> {
        match format {
            ConfigFormat::Yaml => yaml_parse(content),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::parse("<inline>", e.to_string())),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::parse("<inline>", e.to_string())),
        }
    }

    /// Expands `${VAR}` and `${VAR:fallback}` references in raw content.
    ///
    /// An unset variable without a fallback keeps its reference verbatim;
    /// an unterminated `${` leaves the rest of the content untouched.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(open) = rest.find("${") {
            out.push_str(&rest[..open]);
            let inner = &rest[open + 2..];

            let close = match inner.find('}') {
                Some(close) => close,
                None => {
                    out.push_str(&rest[open..]);
                    return out;
                }
            };

            let reference = &inner[..close];
            let (key, fallback) = match reference.split_once(':') {
                Some((key, fallback)) => (key, Some(fallback)),
                None => (reference, None),
            };

            match (env::var(key), fallback) {
                (Ok(value), _) => out.push_str(&value),
                (Err(_), Some(fallback)) => out.push_str(fallback),
                (Err(_), None) => {
                    warn!("environment variable '{}' is not set, keeping the reference", key);
                    out.push_str(&rest[open..open + close + 3]);
                }
            }

            rest = &inner[close + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Applies `PREFIX_*` environment overrides for the flat settings.
    fn apply_env_overrides(&self, config: &mut BridgeConfig) -> ConfigResult<()> {
        if let Ok(value) = env::var(format!("{}_RDS_HOST", self.env_prefix)) {
            config.rds.host = value;
        }
        if let Ok(value) = env::var(format!("{}_RDS_USER", self.env_prefix)) {
            config.rds.user = value;
        }
        if let Ok(value) = env::var(format!("{}_RDS_PASS", self.env_prefix)) {
            config.rds.pass = value;
        }
        if let Ok(value) = env::var(format!("{}_RDS_LANGUAGE", self.env_prefix)) {
            config.rds.language = value;
        }

        if let Ok(value) = env::var(format!("{}_POLL_INTERVAL_MS", self.env_prefix)) {
            config.poll_interval_ms = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(
                    format!("{}_POLL_INTERVAL_MS", self.env_prefix),
                    "expected a number of milliseconds",
                )
            })?;
        }
        if let Ok(value) = env::var(format!("{}_DEBUG_LOG", self.env_prefix)) {
            config.debug_log = parse_bool(&value);
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let parsed = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::parse("<inline>", e.to_string()))?;

    parsed
        .try_deserialize()
        .map_err(|e| ConfigError::parse("<inline>", e.to_string()))
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<BridgeConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_yaml() -> String {
        r#"
rds:
  host: http://rds.local:8080
  user: bridge
  pass: secret

sites:
  - site_id: PICK-01
    host: plc-a
    offset: 10
    default: empty
  - site_id: DROP-01
    host: plc-a
    offset: 12
    default: filled
"#
        .to_string()
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = ConfigLoader::new().with_env_vars(false).load(file.path()).unwrap();

        assert_eq!(config.rds.user, "bridge");
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.reconnect_backoff_ms, 5000);
        assert_eq!(config.site_groups().len(), 1);
    }

    #[test]
    fn test_load_json_string() {
        let json = r#"{
            "rds": {"host": "http://rds.local", "user": "u", "pass": "p"},
            "sites": [
                {"site_id": "A", "host": "plc", "offset": 0, "default": "empty"}
            ]
        }"#;
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.sites[0].site_id, "A");
    }

    #[test]
    fn test_invalid_config_fails_validation() {
        let json = r#"{
            "rds": {"host": "http://rds.local", "user": "u", "pass": "p"},
            "sites": []
        }"#;
        let result = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(json, ConfigFormat::Json);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let json = r#"{
            "rds": {"host": "http://rds.local", "user": "u", "pass": "p"},
            "sites": [],
            "surprise": true
        }"#;
        let result = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(json, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("bridge.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("bridge.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("bridge.ini")).is_err());
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/sitebridge.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let resolved = loader.resolve_env_placeholders("host: ${SITEBRIDGE_TEST_UNSET:plc-a}");
        assert_eq!(resolved, "host: plc-a");
    }

    #[test]
    fn test_placeholder_without_close_kept_verbatim() {
        let loader = ConfigLoader::new();
        let resolved = loader.resolve_env_placeholders("host: ${BROKEN");
        assert_eq!(resolved, "host: ${BROKEN");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }
}
