// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Tries a list of inner tunnels in order, committing to the first that
//! opens (or delivers an instruction) and never retrying after that point.

use std::collections::VecDeque;

use async_trait::async_trait;
use guac_core::{Status, StatusCode};
use tracing::{info, warn};

use crate::error::Result;
use crate::state::{TunnelEvent, TunnelState};
use crate::tunnel::Tunnel;

enum Phase {
    /// Attempting `current`; `remaining` are untried fallbacks.
    Trying { current: Box<dyn Tunnel>, remaining: VecDeque<Box<dyn Tunnel>> },
    /// A tunnel opened or produced an instruction; all further events are
    /// forwarded verbatim and no other tunnel is ever tried.
    Committed(Box<dyn Tunnel>),
    Failed,
}

/// Tunnel that fails over across an ordered list of inner tunnels.
pub struct ChainedTunnel {
    phase: Phase,
    handshake: String,
    state: TunnelState,
}

impl ChainedTunnel {
    #[must_use]
    pub fn new(tunnels: Vec<Box<dyn Tunnel>>) -> Self {
        let mut remaining: VecDeque<_> = tunnels.into_iter().collect();
        let current = remaining.pop_front();
        let phase = current.map_or(Phase::Failed, |current| Phase::Trying { current, remaining });
        Self { phase, handshake: String::new(), state: TunnelState::Connecting }
    }

    fn is_timeout(status: &Status) -> bool {
        status.code == StatusCode::UpstreamTimeout.code()
    }
}

#[async_trait]
impl Tunnel for ChainedTunnel {
    async fn connect(&mut self, handshake: &str) -> Result<()> {
        self.handshake = handshake.to_owned();
        loop {
            let taken = std::mem::replace(&mut self.phase, Phase::Failed);
            let Phase::Trying { mut current, mut remaining } = taken else {
                // Already committed (or failed): nothing left to (re)connect.
                self.phase = taken;
                return Ok(());
            };
            match current.connect(handshake).await {
                Ok(()) => {
                    self.phase = Phase::Trying { current, remaining };
                    return Ok(());
                }
                Err(err) => {
                    let Some(next) = remaining.pop_front() else {
                        self.phase = Phase::Failed;
                        return Err(err);
                    };
                    self.phase = Phase::Trying { current: next, remaining };
                }
            }
        }
    }

    async fn disconnect(&mut self) {
        match &mut self.phase {
            Phase::Trying { current, .. } | Phase::Committed(current) => current.disconnect().await,
            Phase::Failed => {}
        }
        self.state = TunnelState::Closed;
    }

    fn send(&mut self, opcode: &str, elements: &[String]) {
        match &mut self.phase {
            Phase::Trying { current, .. } | Phase::Committed(current) => current.send(opcode, elements),
            Phase::Failed => {}
        }
    }

    fn state(&self) -> TunnelState {
        self.state
    }

    async fn next_event(&mut self) -> Option<TunnelEvent> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Failed) {
                Phase::Committed(mut current) => {
                    let event = current.next_event().await;
                    self.phase = Phase::Committed(current);
                    if let Some(TunnelEvent::State(state)) = &event {
                        self.state = *state;
                    }
                    return event;
                }
                Phase::Failed => return None,
                Phase::Trying { mut current, mut remaining } => {
                    let event = current.next_event().await;
                    match event {
                        Some(TunnelEvent::State(TunnelState::Open)) => {
                            info!("chained tunnel committed to first candidate that opened");
                            self.state = TunnelState::Open;
                            self.phase = Phase::Committed(current);
                            return Some(TunnelEvent::State(TunnelState::Open));
                        }
                        Some(ins @ TunnelEvent::Instruction(..)) => {
                            self.state = TunnelState::Open;
                            self.phase = Phase::Committed(current);
                            return Some(ins);
                        }
                        Some(TunnelEvent::State(TunnelState::Closed | TunnelState::Connecting)) => {
                            self.phase = Phase::Trying { current, remaining };
                        }
                        closed @ (Some(TunnelEvent::Error(_)) | None) => {
                            let status = match closed {
                                Some(TunnelEvent::Error(status)) => status,
                                _ => Status::from(StatusCode::ServerError),
                            };

                            if Self::is_timeout(&status) || remaining.is_empty() {
                                warn!(code = status.code, "chained tunnel exhausted all candidates");
                                self.state = TunnelState::Closed;
                                self.phase = Phase::Failed;
                                return Some(TunnelEvent::Error(status));
                            }

                            // current failed before commit: detach it and
                            // try the next candidate without surfacing
                            // anything to the consumer yet.
                            let Some(mut next) = remaining.pop_front() else {
                                self.state = TunnelState::Closed;
                                self.phase = Phase::Failed;
                                return Some(TunnelEvent::Error(status));
                            };
                            let _ = next.connect(&self.handshake).await;
                            self.phase = Phase::Trying { current: next, remaining };
                        }
                    }
                }
            }
        }
    }
}
