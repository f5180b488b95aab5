// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Incremental parser for the length-prefixed instruction stream.
//!
//! Bytes arrive in arbitrary chunks; [`Parser::receive`] must produce the
//! same sequence of instructions regardless of how the caller split the
//! underlying byte stream.

use crate::error::ProtocolError;

const REBASE_THRESHOLD: usize = 4096;

/// Feeds raw bytes in and drains complete [`crate::Instruction`]s out.
#[derive(Debug)]
pub struct Parser {
    buffer: Vec<u8>,
    start_index: usize,
    /// `None` until the first length prefix has been resolved; mirrors the
    /// `-1` sentinel used by the wire parser this is grounded on.
    element_end: Option<usize>,
    elements: Vec<String>,
    ready: Vec<(String, Vec<String>)>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            start_index: 0,
            element_end: None,
            elements: Vec::new(),
            ready: Vec::new(),
        }
    }

    /// Feed additional bytes from the transport. Complete instructions
    /// become available via [`Parser::next_instruction`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the stream violates the framing grammar.
    /// The parser MUST NOT be fed further bytes after an error: its internal
    /// indices are no longer trustworthy.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        self.buffer.extend_from_slice(bytes);
        self.run()
    }

    /// Pop the oldest instruction produced so far, if any.
    pub fn next_instruction(&mut self) -> Option<(String, Vec<String>)> {
        if self.ready.is_empty() {
            None
        } else {
            Some(self.ready.remove(0))
        }
    }

    fn run(&mut self) -> Result<(), ProtocolError> {
        loop {
            match self.element_end {
                Some(element_end) if element_end >= self.start_index => {
                    if element_end >= self.buffer.len() {
                        return Ok(());
                    }
                    let terminator = self.buffer[element_end];
                    let text = std::str::from_utf8(&self.buffer[self.start_index..element_end])
                        .map_err(|_| ProtocolError::Utf8Boundary { offset: self.start_index })?
                        .to_owned();
                    self.elements.push(text);

                    match terminator {
                        b';' => {
                            let opcode = self.elements.remove(0);
                            let elements = std::mem::take(&mut self.elements);
                            self.ready.push((opcode, elements));
                        }
                        b',' => {}
                        other => {
                            return Err(ProtocolError::InvalidTerminator {
                                offset: element_end,
                                found: other,
                            });
                        }
                    }

                    self.start_index = element_end + 1;
                    self.maybe_rebase();
                }
                _ => {
                    let anchor = self.element_end.map_or(0, |e| e + 1);
                    let Some(dot) = self.buffer[self.start_index..]
                        .iter()
                        .position(|&b| b == b'.')
                        .map(|offset| self.start_index + offset)
                    else {
                        return Ok(());
                    };

                    let digits = std::str::from_utf8(&self.buffer[anchor..dot])
                        .ok()
                        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
                        .ok_or(ProtocolError::InvalidLength { offset: anchor })?;
                    let length: usize =
                        digits.parse().map_err(|_| ProtocolError::InvalidLength { offset: anchor })?;

                    self.start_index = dot + 1;
                    self.element_end = Some(self.start_index + length);
                }
            }
        }
    }

    fn maybe_rebase(&mut self) {
        if self.start_index <= REBASE_THRESHOLD {
            return;
        }
        let shift = self.start_index;
        self.buffer.drain(0..shift);
        self.start_index = 0;
        self.element_end = self.element_end.map(|e| e.saturating_sub(shift));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::encode;

    fn drain_all(p: &mut Parser) -> Vec<(String, Vec<String>)> {
        let mut out = Vec::new();
        while let Some(i) = p.next_instruction() {
            out.push(i);
        }
        out
    }

    #[test]
    fn parses_single_instruction() {
        let mut p = Parser::new();
        p.receive(b"4.sync,1.0;").unwrap();
        assert_eq!(drain_all(&mut p), vec![("sync".to_string(), vec!["0".to_string()])]);
    }

    #[test]
    fn incremental_feed_matches_whole_feed() {
        let wire = encode("png", &["1", "0", "0", "0", "0"]) + &encode("sync", &["5"]);
        let mut whole = Parser::new();
        whole.receive(wire.as_bytes()).unwrap();
        let whole_out = drain_all(&mut whole);

        let mut incremental = Parser::new();
        for byte in wire.as_bytes() {
            incremental.receive(&[*byte]).unwrap();
        }
        let incremental_out = drain_all(&mut incremental);

        assert_eq!(whole_out, incremental_out);
    }

    #[test]
    fn ten_thousand_single_byte_fed_instructions() {
        let one = encode("sync", &["0"]);
        let wire = one.repeat(10_000);
        let mut p = Parser::new();
        for byte in wire.as_bytes() {
            p.receive(&[*byte]).unwrap();
        }
        let mut count = 0;
        while p.next_instruction().is_some() {
            count += 1;
        }
        assert_eq!(count, 10_000);
        assert!(p.buffer.len() < 64);
    }

    #[test]
    fn rejects_bad_terminator() {
        let mut p = Parser::new();
        let err = p.receive(b"4.sync?").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidTerminator { .. }));
    }

    #[test]
    fn rejects_non_digit_length() {
        let mut p = Parser::new();
        let err = p.receive(b"x.sync;").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidLength { .. }));
    }

    #[test]
    fn multibyte_element_length_is_byte_count() {
        let mut p = Parser::new();
        p.receive("4.name,3.世;".as_bytes()).unwrap();
        assert_eq!(drain_all(&mut p), vec![("name".to_string(), vec!["世".to_string()])]);
    }
}
