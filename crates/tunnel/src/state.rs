// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use guac_core::Status;

/// Tunnel connection state. `Closed` is absorbing: once reached, a tunnel
/// never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Connecting,
    Open,
    Closed,
}

/// An event surfaced by a tunnel to its owner, in wire order.
#[derive(Debug, Clone)]
pub enum TunnelEvent {
    State(TunnelState),
    Error(Status),
    Instruction(String, Vec<String>),
}
