// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Owns the live input/output stream tables and the index pool backing them.

use std::collections::HashMap;

use guac_core::{IndexPool, Status};

use crate::error::{Result, StreamError};
use crate::stream::{InputStream, OutputStream};

/// Tracks every live stream, keyed by the index it was allocated under.
///
/// Indices are shared between input and output streams (a given index
/// names at most one live stream of either kind at a time), matching the
/// wire protocol's single integer index space.
#[derive(Debug, Default)]
pub struct StreamTable {
    pool: IndexPool,
    inputs: HashMap<u32, InputStream>,
    outputs: HashMap<u32, OutputStream>,
}

impl StreamTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input stream under a server-supplied index.
    pub fn open_input(&mut self, index: u32) -> &mut InputStream {
        self.inputs.entry(index).or_insert_with(|| InputStream::new(index))
    }

    pub fn input_mut(&mut self, index: u32) -> Option<&mut InputStream> {
        self.inputs.get_mut(&index)
    }

    /// Deliver a blob to the input stream at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnknownIndex`] if no input stream is
    /// registered under `index`.
    pub fn deliver_blob(&mut self, index: u32) -> Result<&mut InputStream> {
        self.inputs.get_mut(&index).ok_or(StreamError::UnknownIndex(index))
    }

    /// End and drop the input stream at `index`.
    pub fn end_input(&mut self, index: u32) {
        self.inputs.remove(&index);
    }

    /// Allocate a fresh output stream for a client-initiated transfer.
    pub fn create_output(&mut self) -> &mut OutputStream {
        let index = self.pool.acquire();
        self.outputs.entry(index).or_insert_with(|| OutputStream::new(index))
    }

    pub fn output_mut(&mut self, index: u32) -> Option<&mut OutputStream> {
        self.outputs.get_mut(&index)
    }

    /// Apply a server acknowledgement to the output stream at `index`. An
    /// error-class status destroys the stream and frees its index.
    pub fn acknowledge(&mut self, index: u32, status: &Status) {
        if status.is_error() {
            self.outputs.remove(&index);
            self.pool.release(index);
        }
    }

    /// Explicitly close and free a client-owned output stream, e.g. after
    /// sending its end signal.
    pub fn close_output(&mut self, index: u32) {
        self.outputs.remove(&index);
        self.pool.release(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_ack_frees_output_index() {
        let mut table = StreamTable::new();
        let index = table.create_output().index();
        table.acknowledge(index, &Status::new(0x0200));
        assert!(table.output_mut(index).is_none());

        let reused = table.create_output().index();
        assert_eq!(reused, index);
    }

    #[test]
    fn success_ack_keeps_stream_open() {
        let mut table = StreamTable::new();
        let index = table.create_output().index();
        table.acknowledge(index, &Status::new(0x0000));
        assert!(table.output_mut(index).is_some());
    }

    #[test]
    fn unknown_blob_index_is_an_error() {
        let mut table = StreamTable::new();
        assert!(table.deliver_blob(42).is_err());
    }
}
