// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Top-level protocol client for a Guacamole-style remote desktop
//! session: opcode dispatch, connection state machine, stream and
//! named-object tables, and the outbound input/transfer API.
//!
//! - [`client::Client`]: owns everything and drives the actor loop.
//! - [`callbacks::Callbacks`]: user-registerable event hooks.
//! - [`object`]: named objects (filesystems) addressed by stream name.
//! - [`audio`]: built-in raw-PCM audio playback backends.

pub mod audio;
pub mod callbacks;
pub mod client;
pub mod error;
pub mod object;

pub use audio::{AudioPlayer, BufferingPlayer, PcmFormat};
pub use callbacks::Callbacks;
pub use client::{Client, ClientState, SurfaceFactory, DEFAULT_KEEP_ALIVE_INTERVAL};
pub use error::{ClientError, Result};
pub use object::{GObject, ObjectTable};
