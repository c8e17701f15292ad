// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus error types.
//!
//! All variants carry the endpoint key (`host:port:unit`) so a single log
//! line identifies the failing PLC. Every error here is transient from the
//! daemon's point of view: the connection is closed, the backoff armed and
//! the affected sites fall back to their defaults.

use std::time::Duration;

use thiserror::Error;
use tokio_modbus::ExceptionCode;

/// Errors produced by the grouped Modbus engine.
#[derive(Debug, Error)]
pub enum ModbusError {
    /// TCP connect failed.
    #[error("Connect to {endpoint} failed: {message}")]
    Connect {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// Underlying failure.
        message: String,
    },

    /// TCP connect did not complete within the request timeout.
    #[error("Connect to {endpoint} timed out after {timeout:?}")]
    ConnectTimeout {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// Hostname resolution produced no usable address.
    #[error("Could not resolve {endpoint}: {message}")]
    Resolve {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// Underlying failure.
        message: String,
    },

    /// The read request did not complete within the request timeout.
    #[error("Request to {endpoint} timed out after {timeout:?}")]
    RequestTimeout {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// Transport or protocol failure while reading.
    #[error("Read from {endpoint} failed: {message}")]
    Read {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// Underlying failure.
        message: String,
    },

    /// The server answered with a Modbus exception.
    #[error("Server exception 0x{code:02X} from {endpoint}")]
    Exception {
        /// Endpoint key `host:port:unit`.
        endpoint: String,
        /// Modbus exception code.
        code: u8,
    },
}

impl ModbusError {
    /// Creates a connect error.
    pub fn connect(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a connect timeout error.
    pub fn connect_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self::ConnectTimeout {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Creates a resolution error.
    pub fn resolve(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    pub fn request_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self::RequestTimeout {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Creates a read error.
    pub fn read(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a server exception error.
    pub fn exception(endpoint: impl Into<String>, code: ExceptionCode) -> Self {
        Self::Exception {
            endpoint: endpoint.into(),
            code: exception_code(&code),
        }
    }
}

/// A Result type with ModbusError.
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Numeric value of a Modbus exception code.
pub(crate) fn exception_code(code: &ExceptionCode) -> u8 {
    match code {
        ExceptionCode::IllegalFunction => 0x01,
        ExceptionCode::IllegalDataAddress => 0x02,
        ExceptionCode::IllegalDataValue => 0x03,
        ExceptionCode::ServerDeviceFailure => 0x04,
        ExceptionCode::Acknowledge => 0x05,
        ExceptionCode::ServerDeviceBusy => 0x06,
        ExceptionCode::MemoryParityError => 0x08,
        ExceptionCode::GatewayPathUnavailable => 0x0A,
        ExceptionCode::GatewayTargetDevice => 0x0B,
        _ => 0xFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_endpoint() {
        let error = ModbusError::connect("plc-a:502:1", "connection refused");
        assert!(error.to_string().contains("plc-a:502:1"));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_exception_codes() {
        assert_eq!(exception_code(&ExceptionCode::IllegalDataAddress), 0x02);
        assert_eq!(exception_code(&ExceptionCode::ServerDeviceBusy), 0x06);

        let error = ModbusError::exception("plc-a:502:1", ExceptionCode::IllegalDataAddress);
        assert_eq!(error.to_string(), "Server exception 0x02 from plc-a:502:1");
    }

    #[test]
    fn test_timeout_display() {
        let error = ModbusError::request_timeout("plc-a:502:1", Duration::from_millis(1000));
        assert!(error.to_string().contains("timed out"));
    }
}
