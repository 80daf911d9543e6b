//! Subscription channel state machine.
//!
//! Each subscription spawns one background task that owns the socket for
//! its whole lifetime, so at most one connection exists per channel. The
//! task reconnects after unexpected disconnects with a fixed delay and
//! re-sends the subscribe envelope on every new connection. A requested
//! close is recorded in a flag that the task consumes exactly once; it
//! suppresses any pending reconnect and moves the channel to `Closed`.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};
use tokio::time;

use blockvision_core::error::ProviderError;

use crate::connector::{WsConnector, WsFrame};

/// Delay between a disconnect and the next connection attempt.
const RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// The event streams BlockVision publishes over WebSocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    NewHeads,
    Logs,
    NewPendingTransactions,
    PendingTransactionsExtended,
}

impl SubscriptionKind {
    /// The tag sent as the first `eth_subscribe` parameter.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::NewHeads => "newHeads",
            Self::Logs => "logs",
            Self::NewPendingTransactions => "newPendingTransactions",
            Self::PendingTransactionsExtended => "pendingTransactionsExtended",
        }
    }

    pub fn accepts_filter(&self) -> bool {
        matches!(self, Self::Logs | Self::PendingTransactionsExtended)
    }
}

/// Server-side filter for `pendingTransactionsExtended`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTxFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_ids: Option<Vec<String>>,
}

/// Server-side filter for `logs`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubscriptionFilter {
    PendingTx(PendingTxFilter),
    Log(LogFilter),
}

/// Lifecycle of a subscription channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ChannelState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// What the channel pushes to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// The subscribe envelope went out over a fresh connection. Emitted
    /// again after every reconnect.
    Open,
    /// One inbound frame, parsed as JSON and forwarded whole: subscribe
    /// acks, notification envelopes and error responses alike. The channel
    /// never filters or reshapes what the server sends.
    Message(Value),
    /// A connection or protocol problem. The channel stays up; only a
    /// closed stream triggers the reconnect path.
    Error(String),
}

struct Shared {
    state: AtomicU8,
    close_requested: AtomicBool,
    close_signal: Notify,
}

impl Shared {
    fn set_state(&self, state: ChannelState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

/// Consumer handle for one subscription channel.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
    shared: Arc<Shared>,
}

impl Subscription {
    /// Next event, or `None` once the channel has fully closed.
    pub async fn next_event(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }

    pub fn state(&self) -> ChannelState {
        self.shared.state()
    }

    /// Request a close. The background task tears the connection down and
    /// will not reconnect, even if a reconnect delay is already pending.
    pub fn unsubscribe(&self) -> Result<(), ProviderError> {
        match self.shared.state() {
            ChannelState::Closed | ChannelState::Closing => Err(ProviderError::Usage(
                "subscription is already closed".into(),
            )),
            _ => {
                self.shared.set_state(ChannelState::Closing);
                self.shared.close_requested.store(true, Ordering::SeqCst);
                self.shared.close_signal.notify_one();
                Ok(())
            }
        }
    }
}

/// Build the channel and spawn its background task.
pub(crate) fn spawn(
    connector: Arc<dyn WsConnector>,
    url: String,
    kind: SubscriptionKind,
    filter: Option<SubscriptionFilter>,
) -> Subscription {
    let shared = Arc::new(Shared {
        state: AtomicU8::new(ChannelState::Connecting as u8),
        close_requested: AtomicBool::new(false),
        close_signal: Notify::new(),
    });
    let (tx, rx) = mpsc::unbounded_channel();

    let envelope = subscribe_envelope(kind, filter.as_ref());
    let task_shared = shared.clone();
    tokio::spawn(async move {
        run_loop(connector, url, envelope, task_shared, tx).await;
    });

    Subscription { events: rx, shared }
}

/// The `eth_subscribe` request sent on every new connection. The id is
/// always 1; only the subscribe call is ever issued on this socket.
fn subscribe_envelope(kind: SubscriptionKind, filter: Option<&SubscriptionFilter>) -> String {
    let mut params = vec![json!(kind.as_tag())];
    if let Some(filter) = filter {
        params.push(json!(filter));
    }
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_subscribe",
        "params": params,
    })
    .to_string()
}

async fn run_loop(
    connector: Arc<dyn WsConnector>,
    url: String,
    envelope: String,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<SubscriptionEvent>,
) {
    loop {
        if shared.state() != ChannelState::Closing {
            shared.set_state(ChannelState::Connecting);
        }

        match connector.connect(&url).await {
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "subscription connect failed");
                let _ = events.send(SubscriptionEvent::Error(e.to_string()));
            }
            Ok(mut conn) => match conn.send_text(envelope.clone()).await {
                Err(e) => {
                    let _ = events.send(SubscriptionEvent::Error(e.to_string()));
                }
                Ok(()) => {
                    if shared.state() != ChannelState::Closing {
                        shared.set_state(ChannelState::Open);
                    }
                    let _ = events.send(SubscriptionEvent::Open);

                    loop {
                        tokio::select! {
                            _ = shared.close_signal.notified() => {
                                conn.close().await;
                                break;
                            }
                            frame = conn.next_frame() => match frame {
                                None | Some(Ok(WsFrame::Close)) => break,
                                Some(Err(e)) => {
                                    // Only the stream ending tears the
                                    // connection down.
                                    tracing::warn!(error = %e, "subscription receive error");
                                    let _ = events.send(SubscriptionEvent::Error(e.to_string()));
                                }
                                Some(Ok(WsFrame::Text(text))) => {
                                    let _ = events.send(parse_frame(&text));
                                }
                            }
                        }
                    }
                }
            },
        }

        if shared.close_requested.swap(false, Ordering::SeqCst) {
            shared.set_state(ChannelState::Closed);
            return;
        }

        tracing::debug!(url = %url, "subscription disconnected, reconnecting");
        tokio::select! {
            _ = time::sleep(RECONNECT_DELAY) => {}
            _ = shared.close_signal.notified() => {
                if shared.close_requested.swap(false, Ordering::SeqCst) {
                    shared.set_state(ChannelState::Closed);
                    return;
                }
            }
        }
    }
}

/// Parse one inbound text frame. Every frame that parses is forwarded
/// whole, subscribe acks included; only unparseable frames become `Error`
/// events, and neither case tears the connection down.
fn parse_frame(text: &str) -> SubscriptionEvent {
    match serde_json::from_str(text) {
        Ok(value) => SubscriptionEvent::Message(value),
        Err(e) => SubscriptionEvent::Error(format!("bad frame: {e}")),
    }
}
