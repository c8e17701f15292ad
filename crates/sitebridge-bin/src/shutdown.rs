// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! Handles OS signals (SIGTERM, SIGINT and SIGQUIT on Unix, Ctrl+C on
//! Windows) and fans the shutdown notification out to subscribers over a
//! broadcast channel. Termination via a signal is the normal way to stop
//! the daemon and exits with status 0.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across the daemon's tasks.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribes to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Initiates shutdown, notifying all subscribers. Idempotent.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS signal (or a manual initiation) and broadcasts it.
    pub async fn wait_for_shutdown(&self) {
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");
            let mut sigquit =
                signal(SignalKind::quit()).expect("Failed to register SIGQUIT handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT");
                }
                _ = sigquit.recv() => {
                    info!("Received SIGQUIT");
                }
            }
        }

        #[cfg(windows)]
        {
            use tokio::signal::ctrl_c;

            ctrl_c().await.expect("Failed to register Ctrl+C handler");
            info!("Received Ctrl+C");
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initiate_notifies_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        assert!(!coordinator.is_shutdown_initiated());

        coordinator.initiate_shutdown();

        assert!(coordinator.is_shutdown_initiated());
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx1 = coordinator.subscribe();
        let mut rx2 = coordinator.subscribe();

        coordinator.initiate_shutdown();

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_double_initiation_is_idempotent() {
        let coordinator = ShutdownCoordinator::new();

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        assert!(coordinator.is_shutdown_initiated());
    }
}
