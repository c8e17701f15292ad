// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Daemon runtime orchestration.
//!
//! The runtime wires the validated configuration into the sync engine and
//! drives it on the poll interval until a shutdown signal arrives:
//!
//! 1. Derive the Modbus endpoint groups
//! 2. Build the group poller and the RDS client
//! 3. Tick `sync_once` on a delay-behaviour interval
//! 4. On shutdown, close all Modbus connections and log out of RDS
//!
//! Cycles are strictly sequential: an overrunning cycle delays the next
//! tick instead of piling ticks up behind it. Each cycle runs in its own
//! task, so a panic inside a cycle ends at the task join and is logged;
//! only startup validation failures terminate the process.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use sitebridge_config::BridgeConfig;
use sitebridge_core::SyncEngine;
use sitebridge_modbus::GroupPoller;
use sitebridge_rds::RdsClient;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// BridgeRuntime
// =============================================================================

/// The assembled daemon.
pub struct BridgeRuntime {
    config: BridgeConfig,
    shutdown: ShutdownCoordinator,
}

impl BridgeRuntime {
    /// Creates a runtime from a validated configuration.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// The shutdown coordinator, cloneable for external initiation.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs the bridge until a termination signal arrives.
    pub async fn run(self) -> BinResult<()> {
        let groups = self.config.site_groups();

        info!(
            version = sitebridge_core::VERSION,
            sites = self.config.sites.len(),
            groups = groups.len(),
            rds = %self.config.rds.host,
            poll_interval_ms = self.config.poll_interval_ms,
            "starting sitebridge"
        );

        let poller = GroupPoller::new(
            self.config.modbus_request_timeout(),
            self.config.reconnect_backoff(),
        );

        let rds = RdsClient::new(
            &self.config.rds.host,
            &self.config.rds.user,
            &self.config.rds.pass,
            &self.config.rds.language,
            self.config.rds.request_timeout(),
        )
        .map_err(|e| BinError::init(format!("building RDS client: {}", e)))?;

        let engine = Arc::new(Mutex::new(SyncEngine::new(
            groups,
            self.config.fill_debounce(),
            poller,
            rds,
        )));

        // Signal handling runs beside the poll loop and broadcasts into it.
        let mut shutdown_rx = self.shutdown.subscribe();
        let signal_waiter = self.shutdown.clone();
        tokio::spawn(async move {
            signal_waiter.wait_for_shutdown().await;
        });

        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => {
                    // The cycle runs in its own task: a panic below the
                    // engine unwinds into the join error, not the loop.
                    let engine = Arc::clone(&engine);
                    let cycle = tokio::spawn(async move {
                        engine.lock().await.sync_once().await;
                    });
                    if let Err(e) = cycle.await {
                        error!(error = %e, "poll cycle aborted, continuing");
                    }
                }
            }
        }

        info!("Shutdown initiated, closing connections...");
        engine.lock().await.shutdown().await;
        info!("sitebridge shutdown complete");

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
