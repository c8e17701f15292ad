// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The seam towards the dispatcher side.
//!
//! The engine publishes every site's effective state on every cycle and
//! relies on the RDS work-site endpoints being idempotent, so there is no
//! read-modify-write and no client-side cache of remote state. The
//! production implementation lives in `sitebridge-rds`.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::LogicalState;

// =============================================================================
// PublishError
// =============================================================================

/// A failed work-site write, already stripped to what the engine logs.
///
/// The engine never aborts a cycle on a publish failure; the error is
/// logged against the site and the remaining sites proceed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PublishError {
    message: String,
}

impl PublishError {
    /// Creates a publish error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// StatePublisher
// =============================================================================

/// Consumer of debounced work-site states.
#[async_trait]
pub trait StatePublisher: Send + Sync {
    /// Makes sure a session exists, logging in if necessary.
    ///
    /// Called once per cycle; a failure here is not fatal because every
    /// [`publish`](StatePublisher::publish) re-establishes the session on
    /// demand.
    async fn ensure_session(&self) -> Result<(), PublishError>;

    /// Publishes `state` for the given work-site id. Idempotent.
    async fn publish(&self, site_id: &str, state: LogicalState) -> Result<(), PublishError>;

    /// Releases the session, best-effort. Called on shutdown.
    async fn close(&self) {}
}
