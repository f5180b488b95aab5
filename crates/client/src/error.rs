// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use guac_core::ProtocolError;
use guac_render::SurfaceError;
use guac_stream::{ReaderError, StreamError};
use guac_tunnel::TunnelError;
use thiserror::Error;

/// The top-level error type most embedders interact with.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Tunnel(#[from] TunnelError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Reader(#[from] ReaderError),
    #[error("no object registered under index {0}")]
    UnknownObject(u32),
    #[error("no stream registered under index {0}")]
    UnknownStream(u32),
}

pub type Result<T> = std::result::Result<T, ClientError>;
