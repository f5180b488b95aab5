// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Typed readers layered over an input stream's raw base64 blobs.
//!
//! Each reader is driven explicitly by the owner feeding it blobs as they
//! arrive and finishing it when the stream ends, rather than registering a
//! callback on the stream itself — ownership stays with whoever holds the
//! reader.

use base64::Engine as _;
use thiserror::Error;

use crate::utf8::StreamingDecoder;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("invalid base64 blob: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

fn decode(base64_text: &str) -> Result<Vec<u8>, ReaderError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(base64_text)?)
}

/// Decodes base64 blobs straight into binary chunks.
#[derive(Debug, Default)]
pub struct ArrayBufferReader;

impl ArrayBufferReader {
    /// Decode one blob body into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Base64`] if `base64_text` is not valid base64.
    pub fn receive_blob(base64_text: &str) -> Result<Vec<u8>, ReaderError> {
        decode(base64_text)
    }
}

/// Decodes blobs as UTF-8 text, carrying a partial codepoint across calls.
#[derive(Debug, Default)]
pub struct StringReader {
    decoder: StreamingDecoder,
}

impl StringReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one blob body, returning the text it completed (may be empty
    /// if the blob ended mid-codepoint).
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Base64`] if `base64_text` is not valid base64.
    pub fn receive_blob(&mut self, base64_text: &str) -> Result<String, ReaderError> {
        let bytes = decode(base64_text)?;
        self.decoder.push(&bytes);
        Ok(self.decoder.take())
    }
}

/// Accumulates blobs into a single binary payload of a known mimetype.
#[derive(Debug)]
pub struct BlobReader {
    mime: String,
    data: Vec<u8>,
}

impl BlobReader {
    #[must_use]
    pub fn new(mime: impl Into<String>) -> Self {
        Self { mime: mime.into(), data: Vec::new() }
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Append one blob's decoded bytes to the accumulated payload.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Base64`] if `base64_text` is not valid base64.
    pub fn receive_blob(&mut self, base64_text: &str) -> Result<(), ReaderError> {
        self.data.extend(decode(base64_text)?);
        Ok(())
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Accumulates base64 text verbatim into a `data:` URI.
///
/// Callers must only hand this reader whole 3-byte groups per blob except
/// possibly the final one, or the base64 text will not concatenate cleanly.
#[derive(Debug)]
pub struct DataUriReader {
    mime: String,
    base64: String,
}

impl DataUriReader {
    #[must_use]
    pub fn new(mime: impl Into<String>) -> Self {
        Self { mime: mime.into(), base64: String::new() }
    }

    pub fn receive_blob(&mut self, base64_text: &str) {
        self.base64.push_str(base64_text);
    }

    #[must_use]
    pub fn finish(self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Wraps [`StringReader`] and parses the accumulated text as JSON once the
/// stream ends.
#[derive(Debug, Default)]
pub struct JsonReader {
    string_reader: StringReader,
    text: String,
}

impl JsonReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ReaderError::Base64`] if `base64_text` is not valid base64.
    pub fn receive_blob(&mut self, base64_text: &str) -> Result<(), ReaderError> {
        self.text.push_str(&self.string_reader.receive_blob(base64_text)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ReaderError::Json`] if the accumulated text is not valid
    /// JSON.
    pub fn finish(self) -> Result<serde_json::Value, ReaderError> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn string_reader_reassembles_split_codepoint() {
        let bytes = "世".as_bytes();
        let mut reader = StringReader::new();
        let first = reader.receive_blob(&b64(&bytes[..1])).unwrap();
        assert_eq!(first, "");
        let second = reader.receive_blob(&b64(&bytes[1..])).unwrap();
        assert_eq!(second, "世");
    }

    #[test]
    fn blob_reader_accumulates_binary() {
        let mut reader = BlobReader::new("text/plain");
        reader.receive_blob(&b64(b"Hello")).unwrap();
        reader.receive_blob(&b64(b", world")).unwrap();
        assert_eq!(reader.into_bytes(), b"Hello, world");
    }

    #[test]
    fn json_reader_parses_accumulated_object() {
        let mut reader = JsonReader::new();
        reader.receive_blob(&b64(br#"{"a":"text/plain"}"#)).unwrap();
        let value = reader.finish().unwrap();
        assert_eq!(value["a"], "text/plain");
    }

    #[test]
    fn data_uri_reader_builds_prefixed_uri() {
        let mut reader = DataUriReader::new("image/png");
        reader.receive_blob("QUJD");
        assert_eq!(reader.finish(), "data:image/png;base64,QUJD");
    }
}
