// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Input and output stream handles, and the blob chunk-size contract.

/// Maximum binary payload carried by a single blob instruction, before
/// base64 expansion. Larger writes MUST be split across multiple blobs.
pub const MAX_BLOB_BYTES: usize = 8064;

/// A server-to-client byte channel multiplexed over the instruction stream.
#[derive(Debug)]
pub struct InputStream {
    index: u32,
    ended: bool,
}

impl InputStream {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self { index, ended: false }
    }

    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Mark the stream as ended. Idempotent.
    pub fn mark_ended(&mut self) {
        self.ended = true;
    }
}

/// A client-to-server byte channel multiplexed over the instruction stream.
#[derive(Debug)]
pub struct OutputStream {
    index: u32,
    ended: bool,
}

impl OutputStream {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self { index, ended: false }
    }

    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn mark_ended(&mut self) {
        self.ended = true;
    }

    /// Split a binary payload into base64-encoded blob bodies, none of which
    /// decode to more than [`MAX_BLOB_BYTES`] bytes.
    #[must_use]
    pub fn split_into_blobs(data: &[u8]) -> Vec<String> {
        use base64::Engine as _;
        data.chunks(MAX_BLOB_BYTES)
            .map(|chunk| base64::engine::general_purpose::STANDARD.encode(chunk))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_exactly_at_boundaries() {
        let data = vec![0u8; 20_000];
        let blobs = OutputStream::split_into_blobs(&data);
        assert_eq!(blobs.len(), 3);

        use base64::Engine as _;
        let decoded_lens: Vec<usize> = blobs
            .iter()
            .map(|b| base64::engine::general_purpose::STANDARD.decode(b).unwrap().len())
            .collect();
        assert_eq!(decoded_lens, vec![8064, 8064, 3872]);
    }

    #[test]
    fn single_blob_for_small_payload() {
        let blobs = OutputStream::split_into_blobs(b"hello");
        assert_eq!(blobs.len(), 1);
    }
}
