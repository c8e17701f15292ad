// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the sitebridge binary.

use thiserror::Error;

/// Result type alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the sitebridge binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initialization error.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Config loading or validation error.
    #[error("Config error: {0}")]
    Config(#[from] sitebridge_config::ConfigError),

    /// RDS client error during startup.
    #[error("RDS error: {0}")]
    Rds(#[from] sitebridge_rds::RdsError),
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Rds(_) => 4,
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate non-zero code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BinError::config("missing site list");
        assert_eq!(err.to_string(), "Configuration error: missing site list");
    }

    #[test]
    fn test_exit_codes_are_nonzero() {
        assert_eq!(BinError::config("x").exit_code(), 1);
        assert_eq!(BinError::init("x").exit_code(), 2);
        assert_eq!(BinError::runtime("x").exit_code(), 3);
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = sitebridge_config::ConfigError::validation("sites", "empty");
        let err: BinError = config_err.into();
        assert_eq!(err.exit_code(), 1);
    }
}
