// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Audio stream playback backends.
//!
//! Actual sound output is the embedder's responsibility; this module
//! only recognizes the two raw PCM mimetypes the protocol guarantees
//! every client understands and hands their decoded samples onward.

/// Accepts one audio stream's raw PCM data and does something with it.
///
/// Concrete playback (writing to an audio device) is left to the
/// embedder; built-in players here only decode the wire format.
pub trait AudioPlayer: Send {
    /// Append freshly decoded PCM bytes.
    fn push(&mut self, pcm: &[u8]);

    /// Called once per received `sync` instruction, after the display
    /// has flushed, to let the player align its clock.
    fn sync(&mut self);
}

/// Parsed parameters out of an `audio/L8` or `audio/L16` mimetype
/// string, e.g. `audio/L16;rate=44100,channels=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub bits_per_sample: u8,
    pub rate: u32,
    pub channels: u8,
}

/// Parse a raw-PCM mimetype, returning `None` if it isn't one of the two
/// mandatory formats every client must support.
#[must_use]
pub fn parse_pcm_mimetype(mimetype: &str) -> Option<PcmFormat> {
    let (base, params) = mimetype.split_once(';').unwrap_or((mimetype, ""));
    let bits_per_sample = match base.trim() {
        "audio/L8" => 8,
        "audio/L16" => 16,
        _ => return None,
    };

    let mut rate = 44100u32;
    let mut channels = 2u8;
    for param in params.split(',') {
        let param = param.trim();
        if let Some(value) = param.strip_prefix("rate=") {
            rate = value.parse().ok()?;
        } else if let Some(value) = param.strip_prefix("channels=") {
            channels = value.parse().ok()?;
        }
    }

    Some(PcmFormat { bits_per_sample, rate, channels })
}

/// A player that just accumulates samples, standing in for a real audio
/// device. Used as the built-in fallback when no user-supplied player
/// accepts the mimetype.
#[derive(Debug, Default)]
pub struct BufferingPlayer {
    format: Option<PcmFormat>,
    samples: Vec<u8>,
}

impl BufferingPlayer {
    #[must_use]
    pub fn for_mimetype(mimetype: &str) -> Option<Self> {
        parse_pcm_mimetype(mimetype).map(|format| Self { format: Some(format), samples: Vec::new() })
    }

    #[must_use]
    pub fn format(&self) -> Option<PcmFormat> {
        self.format
    }

    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

impl AudioPlayer for BufferingPlayer {
    fn push(&mut self, pcm: &[u8]) {
        self.samples.extend_from_slice(pcm);
    }

    fn sync(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_l16_with_params() {
        let format = parse_pcm_mimetype("audio/L16;rate=44100,channels=2").unwrap();
        assert_eq!(format, PcmFormat { bits_per_sample: 16, rate: 44100, channels: 2 });
    }

    #[test]
    fn parses_l8_with_defaults() {
        let format = parse_pcm_mimetype("audio/L8").unwrap();
        assert_eq!(format, PcmFormat { bits_per_sample: 8, rate: 44100, channels: 2 });
    }

    #[test]
    fn rejects_non_pcm_mimetype() {
        assert!(parse_pcm_mimetype("audio/ogg").is_none());
    }

    #[test]
    fn buffering_player_accumulates_pushed_samples() {
        let mut player = BufferingPlayer::for_mimetype("audio/L16;rate=8000,channels=1").unwrap();
        for _ in 0..10_000 {
            player.push(&[0u8; 2]);
        }
        assert_eq!(player.samples().len(), 20_000);
    }
}
