// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Structured error types for the instruction codec and parser.

use thiserror::Error;

/// Errors raised while decoding the wire instruction stream.
///
/// These are always attributable to the transport, never to the caller: a
/// malformed stream means the peer (or an intermediary) violated the framing
/// contract, not that local arguments were invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An element length prefix contained a non-digit byte.
    #[error("invalid element length at byte offset {offset}")]
    InvalidLength { offset: usize },

    /// An element was followed by a byte other than `,` or `;`.
    #[error("invalid element terminator {found:?} at byte offset {offset}")]
    InvalidTerminator { offset: usize, found: u8 },

    /// An element boundary split a multi-byte UTF-8 sequence.
    #[error("element boundary at byte offset {offset} does not fall on a UTF-8 boundary")]
    Utf8Boundary { offset: usize },
}

/// Convenience alias for results from this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = ProtocolError::InvalidLength { offset: 12 };
        assert!(err.to_string().contains('2'));
    }
}
