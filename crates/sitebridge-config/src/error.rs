// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types.
//!
//! Every configuration failure is fatal: the daemon refuses to start on
//! the first violation, naming the offending field or site.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Parser error message.
        message: String,
    },

    /// A field failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two sites share the same identifier.
    #[error("Duplicate site id: {site_id}")]
    DuplicateSiteId {
        /// The duplicated site id.
        site_id: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The file extension names no supported format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The unsupported extension.
        format: String,
    },

    /// An environment variable override carried an unusable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// What was wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a duplicate site id error.
    pub fn duplicate_site_id(site_id: impl Into<String>) -> Self {
        Self::DuplicateSiteId {
            site_id: site_id.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = ConfigError::validation("sites[2].site_id", "cannot be empty");
        assert_eq!(
            error.to_string(),
            "Validation failed for 'sites[2].site_id': cannot be empty"
        );

        let error = ConfigError::duplicate_site_id("PICK-01");
        assert_eq!(error.to_string(), "Duplicate site id: PICK-01");
    }

    #[test]
    fn test_file_not_found() {
        let error = ConfigError::file_not_found("/etc/sitebridge.yaml");
        assert!(error.to_string().contains("/etc/sitebridge.yaml"));
    }
}
