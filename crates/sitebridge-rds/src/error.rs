// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! RDS client error types.

use thiserror::Error;

/// Errors produced by the RDS client.
#[derive(Debug, Error)]
pub enum RdsError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("RDS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// A 401/403 only surfaces here after the one permitted re-login
    /// retry has been spent.
    #[error("RDS returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, empty when unreadable.
        body: String,
    },

    /// Login completed without yielding a session token.
    #[error("RDS login failed: {message}")]
    LoginFailed {
        /// What went wrong.
        message: String,
    },
}

impl RdsError {
    /// Creates a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a login failure.
    pub fn login_failed(message: impl Into<String>) -> Self {
        Self::LoginFailed {
            message: message.into(),
        }
    }

    /// The HTTP status code, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A Result type with RdsError.
pub type RdsResult<T> = Result<T, RdsError>;
