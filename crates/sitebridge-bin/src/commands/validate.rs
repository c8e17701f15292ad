// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use sitebridge_config::load_config;

use crate::cli::{Cli, ValidateArgs};
use crate::error::BinResult;

/// Validates the configuration file without starting the daemon.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config = load_config(&cli.config)?;
    let groups = config.site_groups();

    println!(
        "Configuration OK: {} sites across {} Modbus endpoints",
        config.sites.len(),
        groups.len()
    );

    if args.show_groups {
        for group in &groups {
            println!(
                "  {} -> offsets {}..{} (read length {})",
                group.key,
                group.min_offset,
                group.max_offset,
                group.read_length()
            );
            for site in &group.sites {
                println!(
                    "    {} offset {} default {}",
                    site.site_id, site.offset, site.default
                );
            }
        }
    }

    Ok(())
}
