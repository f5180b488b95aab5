// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The transport-agnostic capability every tunnel variant implements.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{TunnelEvent, TunnelState};

/// A bidirectional transport carrying framed instructions.
///
/// Implementations own their network resources; dropping a tunnel without
/// calling [`Tunnel::disconnect`] is permitted but skips the graceful
/// close handshake.
#[async_trait]
pub trait Tunnel: Send {
    /// Begin connecting, handing the opaque handshake payload to the
    /// transport (e.g. appended to a websocket URL's query string, or
    /// POSTed to an HTTP `?connect` endpoint).
    async fn connect(&mut self, handshake: &str) -> Result<()>;

    /// Gracefully close. Transitions to [`TunnelState::Closed`] with a
    /// success status. Idempotent.
    async fn disconnect(&mut self);

    /// Queue an instruction for transmission. A no-op once the tunnel is
    /// closed.
    fn send(&mut self, opcode: &str, elements: &[String]);

    fn state(&self) -> TunnelState;

    /// Await the next state change, error, or inbound instruction.
    /// Returns `None` once the tunnel is closed and has no further events
    /// buffered.
    async fn next_event(&mut self) -> Option<TunnelEvent>;
}
