// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! sitebridge - Modbus/TCP work-site states mirrored into RDS.
//!
//! Main binary entry point. The daemon polls discrete inputs from PLC
//! gateways, debounces them against per-site safe defaults and publishes
//! the resulting EMPTY/FILLED states to the dispatch server.

use clap::Parser;

use sitebridge_bin::cli::Cli;
use sitebridge_bin::commands;
use sitebridge_bin::error::report_error_and_exit;
use sitebridge_bin::logging::install_panic_hook;

/// Application entry point.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    install_panic_hook();

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
