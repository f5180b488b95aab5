// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use guac_core::Status;
use thiserror::Error;

/// Errors local to a single multiplexed stream.
///
/// These never escalate to the owning client's state machine; they surface
/// only through the affected stream's own callback.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("no stream registered for index {0}")]
    UnknownIndex(u32),

    #[error("stream already ended")]
    Ended,

    #[error("remote reported error status {0:?}")]
    Remote(Status),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
