// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Grouped Modbus/TCP access for the sitebridge daemon.
//!
//! Sites sharing a PLC endpoint are serviced by one connection. The
//! [`GroupPoller`] owns those connections, reads each group's discrete
//! inputs with a single request, closes a connection on any failure and
//! throttles reconnects with a fixed backoff so a dead PLC does not spam
//! connect syscalls or logs.

pub mod error;
pub mod poller;

pub use error::{ModbusError, ModbusResult};
pub use poller::GroupPoller;
