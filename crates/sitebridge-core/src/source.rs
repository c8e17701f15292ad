// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The seam towards the field bus side.
//!
//! The sync engine never talks Modbus directly; it asks an [`InputSource`]
//! for a group's inputs and branches on the tagged [`ReadOutcome`]. The
//! production implementation lives in `sitebridge-modbus`; tests use
//! scripted sources.

use async_trait::async_trait;

use crate::types::Group;

// =============================================================================
// ReadOutcome
// =============================================================================

/// Result of one group read, as a tag the engine can branch on.
///
/// `Backoff` is deliberately not an error: it means the source refused to
/// retry a recently failed endpoint, and the dispatcher already holds the
/// safe state from the failure that armed the backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Decoded discrete inputs; index 0 corresponds to the group's
    /// smallest offset.
    Inputs(Vec<bool>),
    /// No I/O attempted; the endpoint is inside its reconnect backoff.
    Backoff,
    /// Connect or read failed; the connection was closed and backoff armed.
    Failed(String),
}

impl ReadOutcome {
    /// Returns `true` for the backoff tag.
    pub fn is_backoff(&self) -> bool {
        matches!(self, ReadOutcome::Backoff)
    }

    /// Returns `true` for a successful read.
    pub fn is_inputs(&self) -> bool {
        matches!(self, ReadOutcome::Inputs(_))
    }
}

// =============================================================================
// InputSource
// =============================================================================

/// A provider of raw discrete inputs, one connection per group.
#[async_trait]
pub trait InputSource: Send {
    /// Reads the discrete inputs covering `group`.
    ///
    /// Must never panic or block beyond its configured timeouts; every
    /// failure mode is expressed through the returned tag.
    async fn read_group(&mut self, group: &Group) -> ReadOutcome;

    /// Closes all open connections, best-effort. Called on shutdown.
    async fn close_all(&mut self);
}
