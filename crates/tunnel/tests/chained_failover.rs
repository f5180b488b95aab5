// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end chained-tunnel failover scenarios.

use std::collections::VecDeque;

use async_trait::async_trait;
use guac_core::{Status, StatusCode};
use guac_tunnel::{ChainedTunnel, Tunnel, TunnelError, TunnelEvent, TunnelState};

/// A scripted tunnel that plays back a fixed sequence of events and records
/// whether it was ever asked to connect.
struct ScriptedTunnel {
    state: TunnelState,
    connect_result: std::result::Result<(), TunnelError>,
    script: VecDeque<TunnelEvent>,
    connected: bool,
}

impl ScriptedTunnel {
    fn opens_then(events: Vec<TunnelEvent>) -> Self {
        Self { state: TunnelState::Connecting, connect_result: Ok(()), script: events.into(), connected: false }
    }

    fn fails_to_connect(status_code: i32) -> Self {
        Self {
            state: TunnelState::Connecting,
            connect_result: Err(TunnelError::Transport(format!("status {status_code}"))),
            script: VecDeque::new(),
            connected: false,
        }
    }

    fn times_out() -> Self {
        Self {
            state: TunnelState::Connecting,
            connect_result: Ok(()),
            script: VecDeque::from([TunnelEvent::Error(Status::from(StatusCode::UpstreamTimeout))]),
            connected: false,
        }
    }
}

#[async_trait]
impl Tunnel for ScriptedTunnel {
    async fn connect(&mut self, _handshake: &str) -> Result<(), TunnelError> {
        self.connected = true;
        if self.connect_result.is_ok() {
            self.state = TunnelState::Open;
        }
        self.connect_result.clone()
    }

    async fn disconnect(&mut self) {
        self.state = TunnelState::Closed;
    }

    fn send(&mut self, _opcode: &str, _elements: &[String]) {}

    fn state(&self) -> TunnelState {
        self.state
    }

    async fn next_event(&mut self) -> Option<TunnelEvent> {
        self.script.pop_front()
    }
}

#[tokio::test]
async fn second_candidate_commits_third_never_tried() {
    let a = ScriptedTunnel::opens_then(vec![TunnelEvent::Error(Status::from(StatusCode::ServerError))]);
    let b = ScriptedTunnel::opens_then(vec![
        TunnelEvent::Instruction("name".to_string(), vec!["test".to_string()]),
        TunnelEvent::Error(Status::from(StatusCode::ServerError)),
    ]);
    let c = ScriptedTunnel::opens_then(vec![]);

    let mut chained = ChainedTunnel::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
    chained.connect("token").await.unwrap();

    let first = chained.next_event().await;
    assert!(matches!(first, Some(TunnelEvent::Instruction(op, _)) if op == "name"));

    let second = chained.next_event().await;
    assert!(matches!(second, Some(TunnelEvent::Error(status)) if status.code == StatusCode::ServerError.code()));
}

#[tokio::test]
async fn timeout_never_triggers_failover() {
    let a = ScriptedTunnel::times_out();
    let b = ScriptedTunnel::opens_then(vec![]);

    let mut chained = ChainedTunnel::new(vec![Box::new(a), Box::new(b)]);
    chained.connect("token").await.unwrap();

    let event = chained.next_event().await;
    assert!(matches!(event, Some(TunnelEvent::Error(status)) if status.code == StatusCode::UpstreamTimeout.code()));
}

#[tokio::test]
async fn connect_failure_advances_to_next_candidate() {
    let a = ScriptedTunnel::fails_to_connect(StatusCode::ServerError.code());
    let b = ScriptedTunnel::opens_then(vec![TunnelEvent::Instruction("name".to_string(), vec![])]);

    let mut chained = ChainedTunnel::new(vec![Box::new(a), Box::new(b)]);
    chained.connect("token").await.unwrap();

    let event = chained.next_event().await;
    assert!(matches!(event, Some(TunnelEvent::Error(status)) if status.code == StatusCode::ServerError.code()));
}
