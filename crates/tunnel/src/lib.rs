// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Tunnel transports for a Guacamole-style remote desktop protocol.
//!
//! - [`tunnel::Tunnel`]: the transport-agnostic capability.
//! - [`websocket::WebsocketTunnel`]: single websocket connection, `"guacamole"` subprotocol.
//! - [`http::HttpPollTunnel`]: three-endpoint HTTP long-poll transport.
//! - [`chained::ChainedTunnel`]: ordered failover across inner tunnels.

pub mod chained;
pub mod config;
pub mod error;
pub mod http;
pub mod state;
pub mod tunnel;
pub mod websocket;

pub use chained::ChainedTunnel;
pub use config::TunnelConfig;
pub use error::TunnelError;
pub use http::HttpPollTunnel;
pub use state::{TunnelEvent, TunnelState};
pub use tunnel::Tunnel;
pub use websocket::WebsocketTunnel;
