// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// `level` is the default level when `RUST_LOG` is not set; the HTTP
/// stack underneath the RDS client is clamped to warnings either way.
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level))
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap());

    match format {
        LogFormat::Text => init_text_logging(env_filter),
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Compact => init_compact_logging(env_filter),
    }
}

/// Initializes text-based logging (default).
fn init_text_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .init();
}

/// Initializes JSON logging (for production/log aggregation).
fn init_json_logging(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Initializes compact logging (minimal output).
fn init_compact_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(is_terminal),
        )
        .init();
}

// =============================================================================
// Panic Hook
// =============================================================================

/// Installs a process-wide hook that reports panics on the error stream.
///
/// The hook only reports; containment happens in the runtime, which runs
/// each poll cycle in its own task so unwinding ends at the task join.
/// This keeps a cause in the supervisor log for anything that still
/// panics, for example inside a dependency.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "unhandled panic");
        eprintln!("panic: {info}");
    }));
}
