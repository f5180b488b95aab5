// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Stream multiplexing and blob codecs layered on top of `guac-core`.
//!
//! - [`stream`]: input/output stream handles and the blob chunk-size
//!   contract.
//! - [`mux`]: the live stream table, keyed by index and backed by a
//!   [`guac_core::IndexPool`].
//! - [`reader`]: typed readers (array buffer, string, blob, data URI, JSON)
//!   layered over raw blobs.
//! - [`utf8`]: the streaming UTF-8 decoder behind [`reader::StringReader`].

pub mod error;
pub mod mux;
pub mod reader;
pub mod stream;
pub mod utf8;

pub use error::StreamError;
pub use mux::StreamTable;
pub use reader::{ArrayBufferReader, BlobReader, DataUriReader, JsonReader, ReaderError, StringReader};
pub use stream::{InputStream, OutputStream, MAX_BLOB_BYTES};
