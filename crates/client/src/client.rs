// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The top-level protocol client: owns the tunnel, the scene graph, the
//! stream and object tables, and dispatches every inbound instruction.

use std::collections::HashMap;
use std::time::Duration;

use guac_core::{Status, StatusCode};
use guac_render::{Display, Surface};
use guac_stream::reader::BlobReader;
use guac_stream::StreamTable;
use guac_tunnel::{Tunnel, TunnelEvent, TunnelState};
use tracing::{debug, info, warn};

use crate::audio::{AudioPlayer, BufferingPlayer};
use crate::callbacks::Callbacks;
use crate::error::{ClientError, Result};
use crate::object::ObjectTable;

/// Where the client's own state machine sits, independent of the
/// underlying tunnel's connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Connecting,
    Waiting,
    Connected,
    Disconnecting,
    Disconnected,
}

/// Default interval between keep-alive `sync` pings while connected.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Accumulates an `img`-initiated stream's encoded bytes until `end`.
///
/// The original data-URI-flavored reader exists to feed a browser `Image`
/// element a `data:` URI; a [`Surface`] here takes raw encoded bytes
/// directly, so a plain [`BlobReader`] is the better fit and a data URI is
/// never constructed.
struct ImageTarget {
    layer: i32,
    x: f64,
    y: f64,
    mask: u8,
    reader: BlobReader,
}

/// Factory for the raster surfaces backing new layers and buffers.
pub type SurfaceFactory = Box<dyn Fn() -> Box<dyn Surface> + Send>;

pub struct Client {
    tunnel: Box<dyn Tunnel>,
    display: Display,
    make_surface: SurfaceFactory,
    streams: StreamTable,
    objects: ObjectTable,
    audio_players: HashMap<u32, Box<dyn AudioPlayer>>,
    images: HashMap<u32, ImageTarget>,
    callbacks: Callbacks,
    state: ClientState,
    last_received_timestamp: u64,
    last_sent_timestamp: u64,
}

impl Client {
    pub fn new(tunnel: Box<dyn Tunnel>, root_surface: Box<dyn Surface>, make_surface: SurfaceFactory) -> Self {
        Self {
            tunnel,
            display: Display::new(root_surface),
            make_surface,
            streams: StreamTable::new(),
            objects: ObjectTable::new(),
            audio_players: HashMap::new(),
            images: HashMap::new(),
            callbacks: Callbacks::default(),
            state: ClientState::Idle,
            last_received_timestamp: 0,
            last_sent_timestamp: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.state
    }

    #[must_use]
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The timestamp carried by the most recently received `sync`.
    #[must_use]
    pub const fn last_received_timestamp(&self) -> u64 {
        self.last_received_timestamp
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Begin connecting: hands `handshake` to the tunnel and transitions
    /// to `Connecting`, then `Waiting` once the tunnel reports `Open`.
    pub async fn connect(&mut self, handshake: &str) -> Result<()> {
        info!(%handshake, "client connecting");
        self.set_state(ClientState::Connecting);
        self.tunnel.connect(handshake).await?;
        Ok(())
    }

    /// Drain tunnel events until the tunnel closes, dispatching each
    /// inbound instruction. Runs on a single logical task: the caller is
    /// expected to own this future exclusively, matching the
    /// single-actor scheduling model no embedder should bypass with a
    /// mutex-guarded shared `Client`.
    pub async fn run(&mut self) -> Result<()> {
        while let Some(event) = self.tunnel.next_event().await {
            match event {
                TunnelEvent::State(TunnelState::Open) => {
                    self.set_state(ClientState::Waiting);
                }
                TunnelEvent::State(TunnelState::Closed) => {
                    self.set_state(ClientState::Disconnected);
                    break;
                }
                TunnelEvent::State(TunnelState::Connecting) => {}
                TunnelEvent::Error(status) => {
                    warn!(code = status.code, "tunnel error, disconnecting");
                    self.callbacks.fire_error(&status);
                    self.set_state(ClientState::Disconnected);
                    break;
                }
                TunnelEvent::Instruction(opcode, elements) => {
                    if let Err(err) = self.dispatch(&opcode, &elements) {
                        warn!(%opcode, error = %err, "dispatch failed");
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.set_state(ClientState::Disconnecting);
        self.tunnel.send("disconnect", &[]);
        self.tunnel.disconnect().await;
        self.set_state(ClientState::Disconnected);
    }

    fn set_state(&mut self, state: ClientState) {
        if self.state != state {
            info!(?state, "client state transition");
            self.state = state;
        }
    }

    fn layer_mut(&mut self, index: i32) -> Option<&mut guac_render::Layer> {
        if index == 0 {
            Some(self.display.root_mut())
        } else {
            let make_surface = &self.make_surface;
            Some(self.display.layer_or_create(index, || make_surface()))
        }
    }

    fn dispatch(&mut self, opcode: &str, args: &[String]) -> Result<()> {
        debug!(opcode, "dispatching instruction");
        match opcode {
            "arc" => self.op_arc(args),
            "cfill" => self.op_cfill(args),
            "clip" => self.op_clip(args),
            "close" => self.op_close(args),
            "copy" => self.op_copy(args),
            "cstroke" => self.op_cstroke(args),
            "curve" => self.op_curve(args),
            "identity" => self.op_identity(args),
            "img" => self.op_img(args),
            "jpeg" => self.op_legacy_image(args, "image/jpeg"),
            "png" => self.op_legacy_image(args, "image/png"),
            "lfill" => self.op_lfill(args),
            "line" => self.op_line(args),
            "lstroke" => self.op_lstroke(args),
            "pop" => self.op_pop(args),
            "push" => self.op_push(args),
            "rect" => self.op_rect(args),
            "reset" => self.op_reset(args),
            "size" => self.op_size(args),
            "start" => self.op_start(args),
            "transfer" => self.op_transfer(args),
            "transform" => self.op_transform(args),
            "dispose" => self.op_dispose(args),
            "distort" => self.op_distort(args),
            "move" => self.op_move(args),
            "shade" => Ok(()),
            "set" => self.op_set(args),
            "name" => self.op_name(args),
            "error" => self.op_error(args),
            "sync" => self.op_sync(args),
            "ack" => self.op_ack(args),
            "blob" => self.op_blob(args),
            "end" => self.op_end(args),
            "audio" => self.op_audio(args),
            "video" => self.op_video(args),
            "clipboard" => self.op_clipboard(args),
            "file" => self.op_file(args),
            "pipe" => self.op_pipe(args),
            "filesystem" => self.op_filesystem(args),
            "body" => self.op_body(args),
            "undefine" => self.op_undefine(args),
            // Unknown opcodes are forward-compatibility noise, not errors.
            _ => Ok(()),
        }
    }

    // --- drawing opcodes -------------------------------------------------

    fn parse_layer(args: &[String], i: usize) -> Option<i32> {
        args.get(i)?.parse().ok()
    }

    fn parse_f64(args: &[String], i: usize) -> Option<f64> {
        args.get(i)?.parse().ok()
    }

    fn parse_u32(args: &[String], i: usize) -> Option<u32> {
        args.get(i)?.parse().ok()
    }

    fn op_arc(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(x), Some(y), Some(r), Some(start), Some(end), Some(ccw)) = (
            Self::parse_layer(args, 0),
            Self::parse_f64(args, 1),
            Self::parse_f64(args, 2),
            Self::parse_f64(args, 3),
            Self::parse_f64(args, 4),
            Self::parse_f64(args, 5),
            args.get(6),
        ) else {
            return Ok(());
        };
        if let Some(l) = self.layer_mut(layer) {
            l.arc(x, y, r, start, end, ccw == "1");
        }
        Ok(())
    }

    fn op_cfill(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        let Some(mask) = args.get(1).and_then(|s| s.parse::<u8>().ok()) else { return Ok(()) };
        let Some(rgba) = parse_rgba(args, 2) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.set_channel_mask(mask);
            l.fill_color(rgba);
        }
        Ok(())
    }

    fn op_close(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.close_path();
        }
        Ok(())
    }

    fn op_clip(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.clip();
        }
        Ok(())
    }

    fn op_copy(&mut self, args: &[String]) -> Result<()> {
        let (Some(src_idx), Some(sx), Some(sy), Some(w), Some(h), Some(dst_idx), Some(dx), Some(dy)) = (
            Self::parse_layer(args, 0),
            Self::parse_u32(args, 1),
            Self::parse_u32(args, 2),
            Self::parse_u32(args, 3),
            Self::parse_u32(args, 4),
            Self::parse_layer(args, 5),
            Self::parse_u32(args, 6),
            Self::parse_u32(args, 7),
        ) else {
            return Ok(());
        };
        self.layer_mut(src_idx);
        self.layer_mut(dst_idx);
        self.display.with_layer_pair_mut(src_idx, dst_idx, |src, dst| dst.copy(src, sx, sy, w, h, dx, dy));
        Ok(())
    }

    fn op_cstroke(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(cap), Some(join), Some(thickness), Some(mask), Some(rgba)) = (
            Self::parse_layer(args, 0),
            args.get(1).and_then(|s| s.parse::<u8>().ok()).map(line_cap_from_code),
            args.get(2).and_then(|s| s.parse::<u8>().ok()).map(line_join_from_code),
            Self::parse_f64(args, 3),
            args.get(4).and_then(|s| s.parse::<u8>().ok()),
            parse_rgba(args, 5),
        ) else {
            return Ok(());
        };
        if let Some(l) = self.layer_mut(layer) {
            l.set_channel_mask(mask);
            l.stroke_color(cap, join, thickness, rgba);
        }
        Ok(())
    }

    fn op_curve(&mut self, args: &[String]) -> Result<()> {
        let nums: Option<Vec<f64>> = (1..=6).map(|i| Self::parse_f64(args, i)).collect();
        let (Some(layer), Some(nums)) = (Self::parse_layer(args, 0), nums) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.curve_to(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
        }
        Ok(())
    }

    fn op_identity(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.set_transform(guac_render::IDENTITY_MATRIX);
        }
        Ok(())
    }

    fn op_img(&mut self, args: &[String]) -> Result<()> {
        let (Some(stream_idx), Some(mask), Some(layer), Some(mimetype), Some(x), Some(y)) = (
            Self::parse_u32(args, 0),
            args.get(1).and_then(|s| s.parse::<u8>().ok()),
            Self::parse_layer(args, 2),
            args.get(3),
            Self::parse_f64(args, 4),
            Self::parse_f64(args, 5),
        ) else {
            return Ok(());
        };
        self.streams.open_input(stream_idx);
        self.images.insert(stream_idx, ImageTarget { layer, x, y, mask, reader: BlobReader::new(mimetype.clone()) });
        Ok(())
    }

    fn op_legacy_image(&mut self, args: &[String], mimetype: &str) -> Result<()> {
        let (Some(layer), Some(mask), Some(x), Some(y), Some(data_b64)) =
            (Self::parse_layer(args, 0), args.get(1).and_then(|s| s.parse::<u8>().ok()), Self::parse_f64(args, 2), Self::parse_f64(args, 3), args.get(4))
        else {
            return Ok(());
        };
        use base64::Engine as _;
        let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(data_b64) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.set_channel_mask(mask);
            l.draw_encoded_image(x, y, mimetype, &bytes);
        }
        Ok(())
    }

    fn op_lfill(&mut self, args: &[String]) -> Result<()> {
        let (Some(dst), Some(src), Some(mask)) = (Self::parse_layer(args, 0), Self::parse_layer(args, 1), args.get(2).and_then(|s| s.parse::<u8>().ok()))
        else {
            return Ok(());
        };
        self.layer_mut(src);
        self.layer_mut(dst);
        self.display.with_layer_pair_mut(src, dst, |src_layer, dst_layer| {
            dst_layer.set_channel_mask(mask);
            dst_layer.fill_layer(src_layer);
        });
        Ok(())
    }

    fn op_line(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(x), Some(y)) = (Self::parse_layer(args, 0), Self::parse_f64(args, 1), Self::parse_f64(args, 2)) else {
            return Ok(());
        };
        if let Some(l) = self.layer_mut(layer) {
            l.line_to(x, y);
        }
        Ok(())
    }

    fn op_lstroke(&mut self, args: &[String]) -> Result<()> {
        let (Some(dst), Some(src), Some(cap), Some(join), Some(thickness), Some(mask)) = (
            Self::parse_layer(args, 0),
            Self::parse_layer(args, 1),
            args.get(2).and_then(|s| s.parse::<u8>().ok()).map(line_cap_from_code),
            args.get(3).and_then(|s| s.parse::<u8>().ok()).map(line_join_from_code),
            Self::parse_f64(args, 4),
            args.get(5).and_then(|s| s.parse::<u8>().ok()),
        ) else {
            return Ok(());
        };
        self.layer_mut(src);
        self.layer_mut(dst);
        self.display.with_layer_pair_mut(src, dst, |src_layer, dst_layer| {
            dst_layer.set_channel_mask(mask);
            dst_layer.stroke_layer(cap, join, thickness, src_layer);
        });
        Ok(())
    }

    fn op_pop(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.pop();
        }
        Ok(())
    }

    fn op_push(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.push();
        }
        Ok(())
    }

    fn op_rect(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(x), Some(y), Some(w), Some(h)) =
            (Self::parse_layer(args, 0), Self::parse_f64(args, 1), Self::parse_f64(args, 2), Self::parse_f64(args, 3), Self::parse_f64(args, 4))
        else {
            return Ok(());
        };
        if let Some(l) = self.layer_mut(layer) {
            l.rect(x, y, w, h);
        }
        Ok(())
    }

    fn op_reset(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            l.reset();
        }
        Ok(())
    }

    fn op_size(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(w), Some(h)) = (Self::parse_layer(args, 0), Self::parse_u32(args, 1), Self::parse_u32(args, 2)) else {
            return Ok(());
        };
        if layer == 0 {
            self.display.resize_root(w, h);
        } else if let Some(l) = self.layer_mut(layer) {
            l.resize(w, h);
        }
        Ok(())
    }

    fn op_start(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(x), Some(y)) = (Self::parse_layer(args, 0), Self::parse_f64(args, 1), Self::parse_f64(args, 2)) else {
            return Ok(());
        };
        if let Some(l) = self.layer_mut(layer) {
            l.move_to(x, y);
        }
        Ok(())
    }

    fn op_transfer(&mut self, args: &[String]) -> Result<()> {
        let (Some(src), Some(sx), Some(sy), Some(w), Some(h), Some(dst), Some(dx), Some(dy), Some(code)) = (
            Self::parse_layer(args, 0),
            Self::parse_u32(args, 1),
            Self::parse_u32(args, 2),
            Self::parse_u32(args, 3),
            Self::parse_u32(args, 4),
            Self::parse_layer(args, 5),
            Self::parse_u32(args, 6),
            Self::parse_u32(args, 7),
            args.get(8).and_then(|s| s.parse::<u8>().ok()),
        ) else {
            return Ok(());
        };
        self.layer_mut(src);
        self.layer_mut(dst);
        self.display.with_layer_pair_mut(src, dst, |src_layer, dst_layer| dst_layer.transfer(src_layer, sx, sy, w, h, dx, dy, code));
        Ok(())
    }

    fn op_transform(&mut self, args: &[String]) -> Result<()> {
        let nums: Option<Vec<f64>> = (1..=6).map(|i| Self::parse_f64(args, i)).collect();
        let (Some(layer), Some(nums)) = (Self::parse_layer(args, 0), nums) else { return Ok(()) };
        if let Some(l) = self.layer_mut(layer) {
            let matrix: guac_render::AffineMatrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
            l.transform(matrix);
        }
        Ok(())
    }

    // --- scene-graph opcodes ----------------------------------------------

    fn op_dispose(&mut self, args: &[String]) -> Result<()> {
        let Some(layer) = Self::parse_layer(args, 0) else { return Ok(()) };
        self.display.dispose(layer);
        Ok(())
    }

    fn op_distort(&mut self, _args: &[String]) -> Result<()> {
        Ok(())
    }

    fn op_move(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(parent), Some(x), Some(y), Some(z)) =
            (Self::parse_layer(args, 0), Self::parse_layer(args, 1), args.get(2).and_then(|s| s.parse().ok()), args.get(3).and_then(|s| s.parse().ok()), args.get(4).and_then(|s| s.parse().ok()))
        else {
            return Ok(());
        };
        if layer > 0 {
            self.display.move_layer(layer, parent, x, y, z);
        }
        Ok(())
    }

    fn op_set(&mut self, args: &[String]) -> Result<()> {
        let (Some(layer), Some(name)) = (Self::parse_layer(args, 0), args.get(1)) else { return Ok(()) };
        if name == "miter-limit" {
            if let Some(limit) = args.get(2).and_then(|s| s.parse::<f64>().ok()) {
                if let Some(l) = self.layer_mut(layer) {
                    l.set_miter_limit(limit);
                }
            }
        }
        Ok(())
    }

    // --- control opcodes ---------------------------------------------------

    fn op_name(&mut self, args: &[String]) -> Result<()> {
        if let Some(name) = args.first() {
            self.callbacks.fire_name(name);
        }
        Ok(())
    }

    fn op_error(&mut self, args: &[String]) -> Result<()> {
        let message = args.first().cloned().unwrap_or_default();
        let code = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(StatusCode::ServerError.code());
        let status = Status::with_message(code, message);
        self.callbacks.fire_error(&status);
        self.state = ClientState::Disconnecting;
        Ok(())
    }

    fn op_sync(&mut self, args: &[String]) -> Result<()> {
        let Some(timestamp) = args.first().and_then(|s| s.parse::<u64>().ok()) else { return Ok(()) };
        self.last_received_timestamp = timestamp;
        for player in self.audio_players.values_mut() {
            player.sync();
        }
        if timestamp != self.last_sent_timestamp {
            self.tunnel.send("sync", &[timestamp.to_string()]);
            self.last_sent_timestamp = timestamp;
        }
        self.callbacks.fire_sync(timestamp);
        if self.state == ClientState::Waiting {
            self.set_state(ClientState::Connected);
        }
        Ok(())
    }

    // --- stream opcodes ------------------------------------------------------

    fn op_ack(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), message, Some(code)) = (Self::parse_u32(args, 0), args.get(1).cloned().unwrap_or_default(), args.get(2).and_then(|s| s.parse().ok())) else {
            return Ok(());
        };
        let status = Status::with_message(code, message);
        self.streams.acknowledge(index, &status);
        Ok(())
    }

    fn op_blob(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(data)) = (Self::parse_u32(args, 0), args.get(1)) else { return Ok(()) };
        if let Some(image) = self.images.get_mut(&index) {
            image.reader.receive_blob(data)?;
            return Ok(());
        }
        if let Some(player) = self.audio_players.get_mut(&index) {
            let pcm = guac_stream::reader::ArrayBufferReader::receive_blob(data)?;
            player.push(&pcm);
            return Ok(());
        }
        if self.streams.deliver_blob(index).is_err() {
            return Err(ClientError::UnknownStream(index));
        }
        self.callbacks.fire_blob(index, data);
        Ok(())
    }

    fn op_end(&mut self, args: &[String]) -> Result<()> {
        let Some(index) = Self::parse_u32(args, 0) else { return Ok(()) };
        if let Some(image) = self.images.remove(&index) {
            self.streams.end_input(index);
            let mimetype = image.reader.mime().to_string();
            let bytes = image.reader.into_bytes();
            if let Some(l) = self.layer_mut(image.layer) {
                l.set_channel_mask(image.mask);
                l.draw_encoded_image(image.x, image.y, &mimetype, &bytes);
            }
            return Ok(());
        }
        if self.audio_players.remove(&index).is_some() {
            self.streams.end_input(index);
            return Ok(());
        }
        if self.streams.input_mut(index).is_some() {
            self.callbacks.fire_end(index);
        }
        self.streams.end_input(index);
        Ok(())
    }

    fn op_audio(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(mimetype)) = (Self::parse_u32(args, 0), args.get(1)) else { return Ok(()) };
        self.streams.open_input(index);
        let accepted = BufferingPlayer::for_mimetype(mimetype);
        let (message, code) = if let Some(player) = accepted {
            self.audio_players.insert(index, Box::new(player));
            ("OK", StatusCode::Success.code())
        } else {
            ("BAD TYPE", StatusCode::ClientBadType.code())
        };
        self.tunnel.send("ack", &[index.to_string(), message.to_string(), code.to_string()]);
        Ok(())
    }

    fn op_video(&mut self, args: &[String]) -> Result<()> {
        let Some(index) = Self::parse_u32(args, 0) else { return Ok(()) };
        self.streams.open_input(index);
        self.tunnel.send("ack", &[index.to_string(), "BAD TYPE".to_string(), StatusCode::ClientBadType.code().to_string()]);
        Ok(())
    }

    fn op_clipboard(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(mimetype)) = (Self::parse_u32(args, 0), args.get(1)) else { return Ok(()) };
        self.streams.open_input(index);
        let accepted = self.callbacks.fire_clipboard(index, mimetype);
        self.ack_stream(index, accepted, "clipboard handler unsupported");
        Ok(())
    }

    fn op_file(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(mimetype), Some(name)) = (Self::parse_u32(args, 0), args.get(1), args.get(2)) else {
            return Ok(());
        };
        self.streams.open_input(index);
        let accepted = self.callbacks.fire_file(index, mimetype, name);
        self.ack_stream(index, accepted, "file transfer unsupported");
        Ok(())
    }

    fn op_pipe(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(mimetype), Some(name)) = (Self::parse_u32(args, 0), args.get(1), args.get(2)) else {
            return Ok(());
        };
        self.streams.open_input(index);
        let accepted = self.callbacks.fire_pipe(index, mimetype, name);
        self.ack_stream(index, accepted, "pipe unsupported");
        Ok(())
    }

    fn ack_stream(&mut self, index: u32, accepted: bool, rejection_message: &str) {
        let (message, code) =
            if accepted { ("OK", StatusCode::Success.code()) } else { (rejection_message, StatusCode::Unsupported.code()) };
        self.tunnel.send("ack", &[index.to_string(), message.to_string(), code.to_string()]);
    }

    // --- named-object opcodes -----------------------------------------------

    fn op_filesystem(&mut self, args: &[String]) -> Result<()> {
        let (Some(index), Some(name)) = (Self::parse_u32(args, 0), args.get(1)) else { return Ok(()) };
        self.objects.register(index);
        self.callbacks.fire_filesystem(index, name);
        Ok(())
    }

    fn op_body(&mut self, args: &[String]) -> Result<()> {
        let (Some(object_idx), Some(stream_idx), Some(_mimetype), Some(name)) =
            (Self::parse_u32(args, 0), Self::parse_u32(args, 1), args.get(2), args.get(3))
        else {
            return Ok(());
        };
        self.streams.open_input(stream_idx);
        let object = self.objects.get_mut(object_idx).ok_or(ClientError::UnknownObject(object_idx))?;
        object.take_pending_body(name);
        Ok(())
    }

    fn op_undefine(&mut self, args: &[String]) -> Result<()> {
        let Some(index) = Self::parse_u32(args, 0) else { return Ok(()) };
        self.objects.undefine(index);
        Ok(())
    }

    // --- outbound API --------------------------------------------------------

    pub fn send_size(&mut self, width: u32, height: u32) {
        self.tunnel.send("size", &[width.to_string(), height.to_string()]);
    }

    pub fn send_key(&mut self, keysym: u32, pressed: bool) {
        self.tunnel.send("key", &[keysym.to_string(), u8::from(pressed).to_string()]);
    }

    pub fn send_mouse(&mut self, x: i32, y: i32, button_mask: u32) {
        self.tunnel.send("mouse", &[x.to_string(), y.to_string(), button_mask.to_string()]);
    }

    /// Open a new client-to-server stream for a named file transfer.
    pub fn send_file(&mut self, mimetype: &str, name: &str) -> u32 {
        let index = self.streams.create_output().index();
        self.tunnel.send("file", &[index.to_string(), mimetype.to_string(), name.to_string()]);
        index
    }

    pub fn send_pipe(&mut self, mimetype: &str, name: &str) -> u32 {
        let index = self.streams.create_output().index();
        self.tunnel.send("pipe", &[index.to_string(), mimetype.to_string(), name.to_string()]);
        index
    }

    pub fn send_clipboard(&mut self, mimetype: &str) -> u32 {
        let index = self.streams.create_output().index();
        self.tunnel.send("clipboard", &[index.to_string(), mimetype.to_string()]);
        index
    }

    /// Request the named body of an object's stream, queuing the match
    /// for the `body` instruction that will eventually answer it.
    pub fn send_get(&mut self, object_index: u32, name: &str) -> Result<()> {
        let object = self.objects.get_mut(object_index).ok_or(ClientError::UnknownObject(object_index))?;
        object.queue_get(name);
        self.tunnel.send("get", &[object_index.to_string(), name.to_string()]);
        Ok(())
    }

    pub fn send_put(&mut self, object_index: u32, mimetype: &str, name: &str) -> u32 {
        let index = self.streams.create_output().index();
        self.tunnel.send("put", &[object_index.to_string(), index.to_string(), mimetype.to_string(), name.to_string()]);
        index
    }

    pub fn send_blob(&mut self, stream_index: u32, data: &[u8]) {
        for chunk in guac_stream::OutputStream::split_into_blobs(data) {
            self.tunnel.send("blob", &[stream_index.to_string(), chunk]);
        }
    }

    pub fn send_end(&mut self, stream_index: u32) {
        self.tunnel.send("end", &[stream_index.to_string()]);
        self.streams.close_output(stream_index);
    }

    pub fn send_ack(&mut self, stream_index: u32, message: &str, code: i32) {
        self.tunnel.send("ack", &[stream_index.to_string(), message.to_string(), code.to_string()]);
    }
}

fn parse_rgba(args: &[String], start: usize) -> Option<[u8; 4]> {
    Some([args.get(start)?.parse().ok()?, args.get(start + 1)?.parse().ok()?, args.get(start + 2)?.parse().ok()?, args.get(start + 3)?.parse().ok()?])
}

/// Wire codes: 0 butt, 1 round, 2 square. Unknown codes fall back to butt.
fn line_cap_from_code(code: u8) -> guac_render::LineCap {
    match code {
        1 => guac_render::LineCap::Round,
        2 => guac_render::LineCap::Square,
        _ => guac_render::LineCap::Butt,
    }
}

/// Wire codes: 0 bevel, 1 miter, 2 round. Unknown codes fall back to bevel.
fn line_join_from_code(code: u8) -> guac_render::LineJoin {
    match code {
        1 => guac_render::LineJoin::Miter,
        2 => guac_render::LineJoin::Round,
        _ => guac_render::LineJoin::Bevel,
    }
}
