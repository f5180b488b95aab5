// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Instruction framing, incremental parsing, and status codes for a
//! Guacamole-style remote desktop protocol.
//!
//! ## Modules
//!
//! - [`instruction`]: encode an opcode and its elements into wire bytes.
//! - [`parser`]: incrementally decode wire bytes back into instructions.
//! - [`status`]: numeric status codes and the error-classification rule.
//! - [`pool`]: reusable dense integer allocator for stream/object indices.
//! - [`error`]: protocol-level error type.

pub mod error;
pub mod instruction;
pub mod parser;
pub mod pool;
pub mod status;

pub use error::ProtocolError;
pub use instruction::{encode, Instruction};
pub use parser::Parser;
pub use pool::IndexPool;
pub use status::{is_error_code, Status, StatusCode};
