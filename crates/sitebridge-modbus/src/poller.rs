// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The grouped polling engine.
//!
//! One [`GroupPoller`] services all groups. Per group it keeps at most one
//! open `tokio-modbus` context, created lazily on the first read. The
//! failure policy is two-tier: any connect or read error closes the
//! connection so the next cycle reconnects, and reconnect attempts to a
//! failed endpoint are spaced at least `reconnect_backoff` apart. While an
//! endpoint sits inside its backoff the read returns
//! [`ReadOutcome::Backoff`] without touching the network.

use std::collections::HashMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration, Instant};
use tokio_modbus::client::{tcp, Client, Context as ModbusContext, Reader};
use tokio_modbus::Slave;
use tracing::{debug, info, warn};

use sitebridge_core::{Group, InputSource, ReadOutcome};

use crate::error::{ModbusError, ModbusResult};

// =============================================================================
// GroupPoller
// =============================================================================

/// Owns the per-group Modbus connections and reads discrete inputs.
pub struct GroupPoller {
    /// Bounds both the TCP connect and each read request.
    request_timeout: Duration,
    /// Minimum interval between connect attempts to a failed endpoint.
    reconnect_backoff: Duration,
    /// Connection state keyed by group key, created lazily.
    states: HashMap<String, ConnState>,
}

/// Runtime state of one group's connection.
#[derive(Default)]
struct ConnState {
    /// Open context, absent after a failure or before first use.
    ctx: Option<ModbusContext>,
    /// Most recent connect attempt, absent before the first one.
    last_attempt: Option<Instant>,
}

impl GroupPoller {
    /// Creates a poller with the given timeout and backoff.
    pub fn new(request_timeout: Duration, reconnect_backoff: Duration) -> Self {
        Self {
            request_timeout,
            reconnect_backoff,
            states: HashMap::new(),
        }
    }

    /// Number of currently open connections, for diagnostics.
    pub fn open_connections(&self) -> usize {
        self.states.values().filter(|s| s.ctx.is_some()).count()
    }

    /// Drops the connection after a failure and arms the backoff.
    async fn discard_connection(state: &mut ConnState, key: &str) {
        if let Some(mut ctx) = state.ctx.take() {
            if let Err(e) = ctx.disconnect().await {
                warn!(endpoint = %key, error = %e, "error closing Modbus connection");
            }
        }
        state.last_attempt = Some(Instant::now());
    }
}

#[async_trait]
impl InputSource for GroupPoller {
    async fn read_group(&mut self, group: &Group) -> ReadOutcome {
        let now = Instant::now();
        let state = self.states.entry(group.key.clone()).or_default();

        if state.ctx.is_none() {
            if let Some(last) = state.last_attempt {
                if now.duration_since(last) < self.reconnect_backoff {
                    return ReadOutcome::Backoff;
                }
            }

            state.last_attempt = Some(now);
            match connect(group, self.request_timeout).await {
                Ok(ctx) => {
                    info!(endpoint = %group.key, "connected to Modbus endpoint");
                    state.ctx = Some(ctx);
                }
                Err(e) => {
                    debug!(endpoint = %group.key, error = %e, "Modbus connect failed");
                    return ReadOutcome::Failed(e.to_string());
                }
            }
        }

        let ctx = match state.ctx.as_mut() {
            Some(ctx) => ctx,
            None => return ReadOutcome::Failed(format!("no connection to {}", group.key)),
        };

        match read_discrete_inputs(ctx, group, self.request_timeout).await {
            Ok(inputs) => ReadOutcome::Inputs(inputs),
            Err(e) => {
                Self::discard_connection(state, &group.key).await;
                ReadOutcome::Failed(e.to_string())
            }
        }
    }

    async fn close_all(&mut self) {
        for (key, state) in self.states.iter_mut() {
            if let Some(mut ctx) = state.ctx.take() {
                if let Err(e) = ctx.disconnect().await {
                    warn!(endpoint = %key, error = %e, "error closing Modbus connection");
                }
            }
        }
        debug!("all Modbus connections closed");
    }
}

// =============================================================================
// Connection and read helpers
// =============================================================================

/// Opens a Modbus TCP context for the group, bounded by `request_timeout`.
async fn connect(group: &Group, request_timeout: Duration) -> ModbusResult<ModbusContext> {
    let addr = resolve_address(group).await?;

    let connect_future = async {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ModbusError::connect(&group.key, e.to_string()))?;
        stream.set_nodelay(true).ok();
        Ok::<_, ModbusError>(tcp::attach_slave(stream, Slave(group.unit_id())))
    };

    timeout(request_timeout, connect_future)
        .await
        .map_err(|_| ModbusError::connect_timeout(&group.key, request_timeout))?
}

/// Resolves the group endpoint, accepting raw addresses and DNS names.
async fn resolve_address(group: &Group) -> ModbusResult<SocketAddr> {
    let addr_str = format!("{}:{}", group.host(), group.port());

    if let Ok(addr) = addr_str.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let mut addrs = tokio::net::lookup_host(&addr_str)
        .await
        .map_err(|e| ModbusError::resolve(&group.key, e.to_string()))?;

    addrs
        .next()
        .ok_or_else(|| ModbusError::resolve(&group.key, "no addresses returned"))
}

/// Issues one Read Discrete Inputs request covering the group's span.
async fn read_discrete_inputs(
    ctx: &mut ModbusContext,
    group: &Group,
    request_timeout: Duration,
) -> ModbusResult<Vec<bool>> {
    let inputs = timeout(
        request_timeout,
        ctx.read_discrete_inputs(group.min_offset, group.read_length()),
    )
    .await
    .map_err(|_| ModbusError::request_timeout(&group.key, request_timeout))?
    .map_err(|e| ModbusError::read(&group.key, e.to_string()))?
    .map_err(|e| ModbusError::exception(&group.key, e))?;

    Ok(inputs)
}

// =============================================================================
// Tests
// =============================================================================
