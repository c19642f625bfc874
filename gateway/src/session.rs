//! Minimal Discord gateway session.
//!
//! Connects, identifies, keeps the heartbeat going and forwards decoded
//! dispatches into a channel. The session ends on close, on a reconnect or
//! invalid-session request, or when shutdown is signalled; resuming is left
//! to whoever restarts the process.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::tungstenite::Message;

use crate::{GatewayError, GatewayEvent};

/// Default gateway endpoint (API v10, JSON encoding).
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// GUILDS | GUILD_MEMBERS | GUILD_VOICE_STATES | GUILD_MESSAGES | MESSAGE_CONTENT.
pub const DEFAULT_INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 7) | (1 << 9) | (1 << 15);

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

/// A raw gateway frame.
#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: serde_json::Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hello {
    heartbeat_interval: u64,
}

/// One gateway connection.
pub struct GatewaySession {
    url: String,
    token: String,
    intents: u64,
}

impl GatewaySession {
    pub fn new(url: &str, token: &str) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
            intents: DEFAULT_INTENTS,
        }
    }

    pub fn with_intents(mut self, intents: u64) -> Self {
        self.intents = intents;
        self
    }

    fn identify_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "op": OP_IDENTIFY,
            "d": {
                "token": self.token,
                "intents": self.intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "hush",
                    "device": "hush",
                },
            },
        })
    }

    /// Run the session until it closes or `shutdown` fires.
    ///
    /// Returns `Ok(())` on shutdown and an error for every other way the
    /// session can end.
    pub async fn run<T>(
        self,
        events: mpsc::Sender<T>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), GatewayError>
    where
        T: From<GatewayEvent> + Send + 'static,
    {
        let (ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        let (mut ws_sender, mut ws_receiver) = ws.split();
        tracing::info!(url = %self.url, "gateway connected");

        let hello = match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => parse_hello(&text)?,
            Some(Ok(other)) => {
                return Err(GatewayError::Protocol(format!(
                    "expected HELLO, got {other:?}"
                )))
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Err(GatewayError::Closed("closed before HELLO".into())),
        };

        ws_sender
            .send(Message::Text(self.identify_payload().to_string()))
            .await?;

        let period = Duration::from_millis(hello.heartbeat_interval);
        let mut heartbeat = interval_at(Instant::now() + period, period);
        let mut last_seq: Option<u64> = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("gateway session shutting down");
                    let _ = ws_sender.send(Message::Close(None)).await;
                    return Ok(());
                }
                _ = heartbeat.tick() => {
                    ws_sender.send(heartbeat_frame(last_seq)).await?;
                }
                frame = ws_receiver.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(reason))) => {
                            return Err(GatewayError::Closed(format!("{reason:?}")));
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(GatewayError::Closed("stream ended".into())),
                    };

                    let payload: GatewayPayload = match serde_json::from_str(&text) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(error = %e, "undecodable gateway frame");
                            continue;
                        }
                    };
                    if payload.s.is_some() {
                        last_seq = payload.s;
                    }

                    match payload.op {
                        OP_DISPATCH => {
                            let name = payload.t.unwrap_or_default();
                            match GatewayEvent::from_dispatch(&name, payload.d) {
                                Ok(Some(event)) => {
                                    if events.send(T::from(event)).await.is_err() {
                                        tracing::info!("event receiver dropped, closing gateway");
                                        return Ok(());
                                    }
                                }
                                Ok(None) => {}
                                Err(e) => {
                                    tracing::warn!(event = %name, error = %e, "malformed dispatch");
                                }
                            }
                        }
                        OP_HEARTBEAT => {
                            ws_sender.send(heartbeat_frame(last_seq)).await?;
                        }
                        OP_HEARTBEAT_ACK => {
                            tracing::trace!("heartbeat acknowledged");
                        }
                        OP_RECONNECT => {
                            return Err(GatewayError::Closed("server requested reconnect".into()));
                        }
                        OP_INVALID_SESSION => {
                            return Err(GatewayError::Closed("invalid session".into()));
                        }
                        other => {
                            tracing::debug!(op = other, "ignoring gateway opcode");
                        }
                    }
                }
            }
        }
    }
}

fn parse_hello(text: &str) -> Result<Hello, GatewayError> {
    let payload: GatewayPayload =
        serde_json::from_str(text).map_err(|e| GatewayError::Protocol(e.to_string()))?;
    if payload.op != OP_HELLO {
        return Err(GatewayError::Protocol(format!(
            "expected HELLO (op {OP_HELLO}), got op {}",
            payload.op
        )));
    }
    let hello: Hello =
        serde_json::from_value(payload.d).map_err(|e| GatewayError::Protocol(e.to_string()))?;
    if hello.heartbeat_interval == 0 {
        return Err(GatewayError::Protocol("HELLO with zero heartbeat interval".into()));
    }
    Ok(hello)
}

fn heartbeat_frame(last_seq: Option<u64>) -> Message {
    Message::Text(serde_json::json!({ "op": OP_HEARTBEAT, "d": last_seq }).to_string())
}
