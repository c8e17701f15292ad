// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration for the sitebridge daemon.
//!
//! Configuration is read once at startup and validated fail-fast; there is
//! no dynamic reconfiguration. The crate provides:
//!
//! - [`schema`]: the typed configuration structure with validation
//! - [`loader`]: file loading (YAML, TOML, JSON) with environment
//!   variable placeholders and overrides
//! - [`error`]: the configuration error hierarchy

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader};
pub use schema::{BridgeConfig, RdsConfig, SiteConfig};
