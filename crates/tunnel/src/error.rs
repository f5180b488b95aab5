// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use guac_core::{ProtocolError, Status, StatusCode};
use thiserror::Error;

/// Transport-level failures. Every variant maps deterministically to a
/// [`Status`] via [`From<&TunnelError> for Status`] so callers never
/// surface a raw transport error to the protocol layer above the tunnel.
#[derive(Debug, Error, Clone)]
pub enum TunnelError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no response received within the configured timeout")]
    Timeout,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<&TunnelError> for Status {
    fn from(err: &TunnelError) -> Self {
        match err {
            TunnelError::Transport(msg) => Status::with_message(StatusCode::ServerError.code(), msg.clone()),
            TunnelError::Timeout => Status::from(StatusCode::UpstreamTimeout),
            TunnelError::Handshake(msg) => {
                Status::with_message(StatusCode::ClientBadRequest.code(), msg.clone())
            }
            TunnelError::Protocol(_) => Status::from(StatusCode::ServerError),
        }
    }
}

impl From<TunnelError> for Status {
    fn from(err: TunnelError) -> Self {
        Self::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, TunnelError>;
