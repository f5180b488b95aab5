// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end handshake, draw-and-sync, and stream lifecycle scenarios
//! driven through a scripted tunnel instead of real network I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use guac_client::{Client, ClientState};
use guac_render::{AffineMatrix, ChannelMask, LineCap, LineJoin, Surface, TransferFn};
use guac_tunnel::{Tunnel, TunnelError, TunnelEvent, TunnelState};

#[derive(Default)]
struct RecordingSurface {
    width: u32,
    height: u32,
    fills: Arc<Mutex<Vec<[u8; 4]>>>,
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn resize(&mut self, width: u32, height: u32) -> guac_render::Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }
    fn move_to(&mut self, _x: f64, _y: f64) {}
    fn line_to(&mut self, _x: f64, _y: f64) {}
    fn curve_to(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, _x3: f64, _y3: f64) {}
    fn arc(&mut self, _cx: f64, _cy: f64, _radius: f64, _start: f64, _end: f64, _ccw: bool) {}
    fn rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {}
    fn close_path(&mut self) {}
    fn clip(&mut self) {}
    fn fill_color(&mut self, rgba: [u8; 4], _mask: ChannelMask) {
        self.fills.lock().unwrap().push(rgba);
    }
    fn fill_layer(&mut self, _source: &dyn Surface, _mask: ChannelMask) {}
    fn stroke_color(&mut self, _cap: LineCap, _join: LineJoin, _thickness: f64, _rgba: [u8; 4], _mask: ChannelMask) {}
    fn stroke_layer(&mut self, _cap: LineCap, _join: LineJoin, _thickness: f64, _source: &dyn Surface, _mask: ChannelMask) {}
    fn draw_image(&mut self, _x: f64, _y: f64, _rgba: &[u8], _width: u32, _height: u32) {}
    fn draw_encoded_image(&mut self, _x: f64, _y: f64, _mimetype: &str, _data: &[u8]) {}
    #[allow(clippy::too_many_arguments)]
    fn transfer(&mut self, _source: &dyn Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32, _f: TransferFn) {}
    fn put(&mut self, _source: &dyn Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32) {}
    fn copy(&mut self, _source: &dyn Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32) {}
    fn push(&mut self) {}
    fn pop(&mut self) {}
    fn reset(&mut self) {}
    fn set_transform(&mut self, _matrix: AffineMatrix) {}
    fn transform(&mut self, _matrix: AffineMatrix) {}
    fn set_channel_mask(&mut self, _mask: ChannelMask) {}
    fn set_miter_limit(&mut self, _limit: f64) {}
}

struct ScriptedTunnel {
    state: TunnelState,
    script: VecDeque<TunnelEvent>,
    sent: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl ScriptedTunnel {
    fn new(events: Vec<TunnelEvent>, sent: Arc<Mutex<Vec<(String, Vec<String>)>>>) -> Self {
        Self { state: TunnelState::Connecting, script: events.into(), sent }
    }
}

#[async_trait]
impl Tunnel for ScriptedTunnel {
    async fn connect(&mut self, _handshake: &str) -> Result<(), TunnelError> {
        self.state = TunnelState::Open;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.state = TunnelState::Closed;
    }

    fn send(&mut self, opcode: &str, elements: &[String]) {
        self.sent.lock().unwrap().push((opcode.to_string(), elements.to_vec()));
    }

    fn state(&self) -> TunnelState {
        self.state
    }

    async fn next_event(&mut self) -> Option<TunnelEvent> {
        self.script.pop_front()
    }
}

fn instr(opcode: &str, elements: &[&str]) -> TunnelEvent {
    TunnelEvent::Instruction(opcode.to_string(), elements.iter().map(|s| s.to_string()).collect())
}

#[tokio::test]
async fn handshake_reaches_connected_on_first_sync() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let tunnel = ScriptedTunnel::new(
        vec![TunnelEvent::State(TunnelState::Open), instr("name", &["test-server"]), instr("sync", &["100"])],
        sent,
    );
    let fills = Arc::new(Mutex::new(Vec::new()));
    let root = RecordingSurface { fills: fills.clone(), ..Default::default() };
    let layer_fills = fills.clone();
    let mut client = Client::new(
        Box::new(tunnel),
        Box::new(root),
        Box::new(move || -> Box<dyn Surface> { Box::new(RecordingSurface { fills: layer_fills.clone(), ..Default::default() }) }),
    );

    let received_name = Arc::new(Mutex::new(None));
    let out = received_name.clone();
    client.callbacks_mut().on_name = Some(Box::new(move |name: &str| {
        *out.lock().unwrap() = Some(name.to_string());
    }));

    client.connect("token").await.unwrap();
    assert_eq!(client.state(), ClientState::Connecting);

    client.run().await.unwrap();
    assert_eq!(client.state(), ClientState::Connected);
    assert_eq!(received_name.lock().unwrap().as_deref(), Some("test-server"));
}

#[tokio::test]
async fn draw_instruction_reaches_the_root_surface() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let tunnel =
        ScriptedTunnel::new(vec![TunnelEvent::State(TunnelState::Open), instr("cfill", &["0", "14", "255", "0", "0", "255"])], sent);
    let fills = Arc::new(Mutex::new(Vec::new()));
    let root = RecordingSurface { fills: fills.clone(), ..Default::default() };
    let layer_fills = fills.clone();
    let mut client = Client::new(
        Box::new(tunnel),
        Box::new(root),
        Box::new(move || -> Box<dyn Surface> { Box::new(RecordingSurface { fills: layer_fills.clone(), ..Default::default() }) }),
    );

    client.connect("token").await.unwrap();
    client.run().await.unwrap();

    assert_eq!(*fills.lock().unwrap(), vec![[255, 0, 0, 255]]);
}

#[tokio::test]
async fn server_error_fires_on_error_and_disconnects() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let tunnel = ScriptedTunnel::new(
        vec![TunnelEvent::State(TunnelState::Open), instr("error", &["boom", "512"]), TunnelEvent::State(TunnelState::Closed)],
        sent,
    );
    let root = RecordingSurface::default();
    let mut client = Client::new(Box::new(tunnel), Box::new(root), Box::new(|| -> Box<dyn Surface> { Box::new(RecordingSurface::default()) }));

    let error_seen = Arc::new(Mutex::new(false));
    let flag = error_seen.clone();
    client.callbacks_mut().on_error = Some(Box::new(move |_status| {
        *flag.lock().unwrap() = true;
    }));

    client.connect("token").await.unwrap();
    client.run().await.unwrap();

    assert!(*error_seen.lock().unwrap());
}
