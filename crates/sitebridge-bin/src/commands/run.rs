// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use sitebridge_config::load_config;

use crate::cli::Cli;
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::BridgeRuntime;

/// Executes the `run` command to start the bridge.
///
/// Configuration is loaded before logging is initialized so the
/// `debug_log` setting can raise the effective level; a load failure is
/// reported on stderr with a non-zero exit either way.
pub async fn run(cli: &Cli) -> BinResult<()> {
    let config = load_config(&cli.config)?;

    let level = if config.debug_log && !cli.quiet {
        "debug"
    } else {
        cli.effective_log_level()
    };
    init_logging(level, cli.log_format);

    BridgeRuntime::new(config).run().await
}
