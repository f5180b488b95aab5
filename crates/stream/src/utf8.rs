// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Streaming UTF-8 decode/encode, used by [`crate::reader::StringReader`] to
//! reassemble text that may be split mid-codepoint across blobs.

const REPLACEMENT: char = '\u{FFFD}';

/// Decodes a byte stream into text one byte at a time, tolerating sequences
/// split across separate [`StreamingDecoder::push`] calls.
///
/// Ill-formed sequences are replaced with U+FFFD rather than causing an
/// error; this decoder never fails.
#[derive(Debug, Default)]
pub struct StreamingDecoder {
    remaining: u8,
    codepoint: u32,
    out: String,
}

impl StreamingDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; decoded text accumulates and is retrieved with
    /// [`StreamingDecoder::take`].
    pub fn push(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push_byte(byte);
        }
    }

    fn push_byte(&mut self, byte: u8) {
        if self.remaining == 0 {
            match byte {
                0x00..=0x7F => self.emit(u32::from(byte)),
                0xC0..=0xDF => self.start(u32::from(byte & 0x1F), 1),
                0xE0..=0xEF => self.start(u32::from(byte & 0x0F), 2),
                0xF0..=0xF7 => self.start(u32::from(byte & 0x07), 3),
                _ => self.invalid(),
            }
            return;
        }

        if byte & 0xC0 == 0x80 {
            self.codepoint = (self.codepoint << 6) | u32::from(byte & 0x3F);
            self.remaining -= 1;
            if self.remaining == 0 {
                let codepoint = self.codepoint;
                self.emit(codepoint);
            }
        } else {
            self.invalid();
            // The byte that broke the sequence may itself start a new one.
            self.push_byte(byte);
        }
    }

    fn start(&mut self, initial: u32, remaining: u8) {
        self.codepoint = initial;
        self.remaining = remaining;
    }

    fn emit(&mut self, codepoint: u32) {
        self.remaining = 0;
        match char::from_u32(codepoint) {
            Some(c) => self.out.push(c),
            None => self.out.push(REPLACEMENT),
        }
    }

    fn invalid(&mut self) {
        self.remaining = 0;
        self.out.push(REPLACEMENT);
    }

    /// Drain accumulated text so far.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

/// Encode `text` to UTF-8 bytes; codepoints beyond `0x1F_FFFF` are replaced
/// with U+FFFD (the standard encoder cannot represent them as valid
/// `char`s, so this is purely defensive for raw-codepoint callers).
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ascii() {
        let mut d = StreamingDecoder::new();
        d.push(b"hello");
        assert_eq!(d.take(), "hello");
    }

    #[test]
    fn decodes_split_multibyte_sequence() {
        let bytes = "世".as_bytes();
        assert_eq!(bytes.len(), 3);
        let mut d = StreamingDecoder::new();
        d.push(&bytes[..1]);
        d.push(&bytes[1..]);
        assert_eq!(d.take(), "世");
    }

    #[test]
    fn replaces_invalid_leading_byte() {
        let mut d = StreamingDecoder::new();
        d.push(&[0xFF, b'a']);
        assert_eq!(d.take(), "\u{FFFD}a");
    }

    #[test]
    fn replaces_invalid_continuation() {
        let mut d = StreamingDecoder::new();
        d.push(&[0xE0, 0x41]);
        assert_eq!(d.take(), "\u{FFFD}A");
    }

    #[test]
    fn never_panics_on_arbitrary_bytes() {
        for seed in 0u8..=255 {
            let mut d = StreamingDecoder::new();
            let bytes: Vec<u8> = (0..16).map(|i| seed.wrapping_mul(i + 1)).collect();
            d.push(&bytes);
            let _ = d.take();
        }
    }
}
