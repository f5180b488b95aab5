// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! HTTP long-poll tunnel: `?connect`, `?read:<uuid>:<seq>`, `?write:<uuid>`.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::StreamExt;
use guac_core::{encode, Parser, Status, StatusCode};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::TunnelConfig;
use crate::error::{Result, TunnelError};
use crate::state::{TunnelEvent, TunnelState};
use crate::tunnel::Tunnel;

/// Tunnel backed by three derived HTTP endpoints against a base URL.
///
/// The read side issues one long-poll GET at a time and immediately
/// reissues it on completion; the overlapping dual-read optimization
/// described for the browser client is a latency refinement, not a
/// correctness requirement, and is not reproduced here.
pub struct HttpPollTunnel {
    base_url: Url,
    config: TunnelConfig,
    client: Client,
    state: TunnelState,
    session_id: Option<String>,
    seq: u64,
    write_buffer: String,
    write_in_flight: bool,
    parser: Parser,
    pending_events: VecDeque<TunnelEvent>,
}

impl HttpPollTunnel {
    #[must_use]
    pub fn new(base_url: Url, config: TunnelConfig) -> Self {
        Self {
            base_url,
            config,
            client: Client::new(),
            state: TunnelState::Connecting,
            session_id: None,
            seq: 0,
            write_buffer: String::new(),
            write_in_flight: false,
            parser: Parser::new(),
            pending_events: VecDeque::new(),
        }
    }

    fn endpoint(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(Some(query));
        url
    }

    fn set_state(&mut self, state: TunnelState) {
        self.state = state;
        self.pending_events.push_back(TunnelEvent::State(state));
    }

    fn close_with(&mut self, status: Status) {
        self.pending_events.push_back(TunnelEvent::Error(status));
        self.set_state(TunnelState::Closed);
    }

    fn status_from_response(resp: &reqwest::Response) -> Status {
        let code = resp
            .headers()
            .get("Guacamole-Status-Code")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(StatusCode::ServerError.code());
        let message =
            resp.headers().get("Guacamole-Error-Message").and_then(|v| v.to_str().ok()).map(str::to_owned);
        message.map_or_else(|| Status::new(code), |msg| Status::with_message(code, msg))
    }

    async fn flush_write(&mut self) -> Result<()> {
        if self.write_buffer.is_empty() || self.write_in_flight {
            return Ok(());
        }
        let Some(session_id) = self.session_id.clone() else { return Ok(()) };
        let body = std::mem::take(&mut self.write_buffer);
        self.write_in_flight = true;

        let url = self.endpoint(&format!("write:{session_id}"));
        let result = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
            .body(body)
            .send()
            .await;
        self.write_in_flight = false;

        match result {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(TunnelError::Transport(status_to_string_lossy(&Self::status_from_response(&resp)))),
            Err(err) => Err(TunnelError::Transport(err.to_string())),
        }
    }

    async fn poll_once(&mut self) -> Result<()> {
        let Some(session_id) = self.session_id.clone() else { return Ok(()) };
        let seq = self.seq;
        self.seq += 1;
        let url = self.endpoint(&format!("read:{session_id}:{seq}"));

        let resp = self.client.get(url).send().await.map_err(|e| TunnelError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = Self::status_from_response(&resp);
            if self.state == TunnelState::Open && status.code == StatusCode::ResourceNotFound.code() {
                // Per the read-termination contract: clear any pending
                // polling interval and treat this as a clean end of stream.
                self.set_state(TunnelState::Closed);
                return Ok(());
            }
            return Err(TunnelError::Transport(status_to_string_lossy(&status)));
        }

        let mut body = resp.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| TunnelError::Transport(e.to_string()))?;
            self.parser.receive(&chunk)?;
            while let Some((opcode, elements)) = self.parser.next_instruction() {
                self.pending_events.push_back(TunnelEvent::Instruction(opcode, elements));
            }
        }
        Ok(())
    }
}

fn status_to_string_lossy(status: &Status) -> String {
    status.message.clone().unwrap_or_else(|| format!("status {}", status.code))
}

#[async_trait]
impl Tunnel for HttpPollTunnel {
    async fn connect(&mut self, handshake: &str) -> Result<()> {
        let url = self.endpoint("connect");
        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
            .body(handshake.to_owned())
            .send()
            .await
            .map_err(|e| TunnelError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = Self::status_from_response(&resp);
            return Err(TunnelError::Transport(status_to_string_lossy(&status)));
        }

        let body = resp.text().await.map_err(|e| TunnelError::Transport(e.to_string()))?;
        self.session_id = Some(body.trim().to_owned());
        debug!(session_id = ?self.session_id, "http tunnel connected");
        self.set_state(TunnelState::Open);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.set_state(TunnelState::Closed);
    }

    fn send(&mut self, opcode: &str, elements: &[String]) {
        if self.state != TunnelState::Open {
            return;
        }
        self.write_buffer.push_str(&encode(opcode, elements));
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

            if let Err(err) = self.flush_write().await {
                self.close_with(Status::from(&err));
                continue;
            }

            match tokio::time::timeout(self.config.receive_timeout, self.poll_once()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => self.close_with(Status::from(&err)),
                Err(_) => {
                    warn!("http poll tunnel receive timed out");
                    self.close_with(Status::from(StatusCode::UpstreamTimeout));
                }
            }
        }
    }
}
