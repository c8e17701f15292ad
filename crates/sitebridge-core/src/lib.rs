// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core domain model and control loop for the sitebridge daemon.
//!
//! sitebridge mirrors the physical state of discrete sensors (one Modbus
//! discrete input per work-site) into the logical work-site inventory of a
//! robotics dispatch server (RDS). This crate holds everything that is
//! independent of the concrete transports:
//!
//! - [`types`]: logical states, site records and the per-endpoint grouping
//! - [`debounce`]: the default-biased hysteresis state machine
//! - [`source`] / [`publisher`]: the seams towards the Modbus and RDS sides
//! - [`sync`]: the engine that drives one poll cycle
//!
//! The transports themselves live in `sitebridge-modbus` and
//! `sitebridge-rds`; the binary crate wires everything together.

pub mod debounce;
pub mod publisher;
pub mod source;
pub mod sync;
pub mod types;

pub use debounce::Debouncer;
pub use publisher::{PublishError, StatePublisher};
pub use source::{InputSource, ReadOutcome};
pub use sync::SyncEngine;
pub use types::{Group, LogicalState, Site};

/// Crate version, shared by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
