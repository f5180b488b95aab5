// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Single-connection websocket tunnel, subprotocol `"guacamole"`.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use guac_core::{encode, Parser, Status, StatusCode};
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::TunnelConfig;
use crate::error::{Result, TunnelError};
use crate::state::{TunnelEvent, TunnelState};
use crate::tunnel::Tunnel;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Tunnel backed by a single websocket connection.
pub struct WebsocketTunnel {
    url: Url,
    config: TunnelConfig,
    state: TunnelState,
    stream: Option<WsStream>,
    parser: Parser,
    pending_out: VecDeque<String>,
    pending_events: VecDeque<TunnelEvent>,
}

impl WebsocketTunnel {
    #[must_use]
    pub fn new(url: Url, config: TunnelConfig) -> Self {
        Self {
            url,
            config,
            state: TunnelState::Connecting,
            stream: None,
            parser: Parser::new(),
            pending_out: VecDeque::new(),
            pending_events: VecDeque::new(),
        }
    }

    fn set_state(&mut self, state: TunnelState) {
        self.state = state;
        self.pending_events.push_back(TunnelEvent::State(state));
    }

    fn close_with(&mut self, status: Status) {
        self.pending_events.push_back(TunnelEvent::Error(status));
        self.set_state(TunnelState::Closed);
        self.stream = None;
    }

    fn drain_parser(&mut self) {
        while let Some((opcode, elements)) = self.parser.next_instruction() {
            self.pending_events.push_back(TunnelEvent::Instruction(opcode, elements));
        }
    }
}

#[async_trait]
impl Tunnel for WebsocketTunnel {
    async fn connect(&mut self, handshake: &str) -> Result<()> {
        let mut url = self.url.clone();
        url.set_query(Some(handshake));

        let request = tokio_tungstenite::tungstenite::handshake::client::Request::builder()
            .uri(url.as_str())
            .header("Sec-WebSocket-Protocol", "guacamole")
            .header("Host", url.host_str().unwrap_or_default())
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header(
                "Sec-WebSocket-Key",
                tokio_tungstenite::tungstenite::handshake::client::generate_key(),
            )
            .body(())
            .map_err(|e| TunnelError::Handshake(e.to_string()))?;

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| TunnelError::Transport(e.to_string()))?;

        info!(url = %self.url, "websocket tunnel connected");
        self.stream = Some(stream);
        self.set_state(TunnelState::Open);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.state == TunnelState::Closed {
            return;
        }
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
        self.set_state(TunnelState::Closed);
    }

    fn send(&mut self, opcode: &str, elements: &[String]) {
        if self.state != TunnelState::Open {
            return;
        }
        self.pending_out.push_back(encode(opcode, elements));
    }

    fn state(&self) -> TunnelState {
        self.state
    }

    async fn next_event(&mut self) -> Option<TunnelEvent> {
        loop {
            if let Some(event) = self.pending_events.pop_front() {
                return Some(event);
            }
            if self.state == TunnelState::Closed {
                return None;
            }
            let mut send_failed = false;
            while let Some(text) = self.pending_out.pop_front() {
                trace!(bytes = text.len(), "flushing outbound frame");
                let Some(stream) = self.stream.as_mut() else { break };
                if stream.send(Message::Text(text.into())).await.is_err() {
                    send_failed = true;
                    break;
                }
            }
            if send_failed {
                self.close_with(Status::from(StatusCode::ServerError));
                continue;
            }
            if self.state == TunnelState::Closed {
                continue;
            }

            let Some(stream) = self.stream.as_mut() else {
                return None;
            };
            let timeout = tokio::time::timeout(self.config.receive_timeout, stream.next()).await;
            let Ok(message) = timeout else {
                warn!("websocket tunnel receive timed out");
                self.close_with(Status::from(StatusCode::UpstreamTimeout));
                continue;
            };

            match message {
                Some(Ok(Message::Text(text))) => {
                    debug!(bytes = text.len(), "inbound frame");
                    if let Err(err) = self.parser.receive(text.as_bytes()) {
                        self.close_with(Status::from(&TunnelError::from(err)));
                        continue;
                    }
                    self.drain_parser();
                }
                Some(Ok(Message::Close(frame))) => {
                    let status = frame.map_or(Status::from(StatusCode::Success), |f| {
                        if f.code == CloseCode::Normal {
                            Status::from(StatusCode::Success)
                        } else {
                            Status::with_message(StatusCode::ServerError.code(), f.reason.to_string())
                        }
                    });
                    self.close_with(status);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    self.close_with(Status::with_message(StatusCode::ServerError.code(), err.to_string()));
                }
                None => {
                    self.close_with(Status::from(StatusCode::Success));
                }
            }
        }
    }
}

/// Default polling cadence used by the long-poll transport, re-exported for
/// callers building a [`TunnelConfig`] by hand.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(15_000);
