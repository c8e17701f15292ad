// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! The daemon normally runs with no arguments at all (the supervisor
//! surface is just "start it"); the flags below exist for operators:
//!
//! - `run`: start the bridge (default)
//! - `validate`: check the configuration file without starting
//! - `version`: show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// sitebridge - mirrors Modbus discrete inputs into RDS work-site states.
#[derive(Parser, Debug)]
#[command(
    name = "sitebridge",
    author = "Sylvex <contact@sylvex.io>",
    version = sitebridge_core::VERSION,
    about = "Modbus/TCP to RDS work-site bridge",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "sitebridge.yaml",
        env = "SITEBRIDGE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "SITEBRIDGE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "SITEBRIDGE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the bridge daemon
    ///
    /// This is the default command when no subcommand is specified.
    Run,

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the
    /// daemon, reporting the derived Modbus endpoint groups.
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Print the derived endpoint groups after validation
    #[arg(short = 'g', long)]
    pub show_groups: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["sitebridge"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run));
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["sitebridge", "validate", "--show-groups"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_groups);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["sitebridge", "-c", "/etc/sitebridge/bridge.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/sitebridge/bridge.yaml"));
    }

    #[test]
    fn test_quiet_mode() {
        let cli = Cli::parse_from(["sitebridge", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.effective_log_level(), "warn");
    }

    #[test]
    fn test_verbose_mode() {
        let cli = Cli::parse_from(["sitebridge", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_log_format() {
        let cli = Cli::parse_from(["sitebridge", "--log-format", "json"]);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
