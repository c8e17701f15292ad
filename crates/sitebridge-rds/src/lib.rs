// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP client for the robotics dispatch server (RDS).
//!
//! The dispatcher exposes a cookie-session JSON API. This crate keeps the
//! session transparent to its callers: the first call logs in, an expired
//! session (401/403) is renewed with exactly one retry of the failed
//! request, and the work-site mutators are idempotent so callers may
//! publish the same state every cycle without reading it back.

pub mod client;
pub mod cookie;
pub mod error;

pub use client::{RdsClient, SESSION_COOKIE};
pub use error::{RdsError, RdsResult};
