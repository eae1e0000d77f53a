use async_trait::async_trait;
use convomux_core::SinkError;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Outbound seam to the session provider.
///
/// Presentation calls [`send_message`](Self::send_message) to inject a local
/// chat message; failures are surfaced to the caller and never touch engine
/// state, so the user's input can be retried.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Returns the sink's name (e.g. `"channel"`, `"null"`).
    fn name(&self) -> &str;
    /// Dispatch one outbound chat message.
    async fn send_message(&self, text: &str) -> Result<(), SinkError>;
    /// Returns `true` if the sink is currently able to accept messages.
    fn is_connected(&self) -> bool;
}

/// Hands outbound text to the provider binding over an mpsc channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
    send_count: AtomicUsize,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                send_count: AtomicUsize::new(0),
            },
            rx,
        )
    }

    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    async fn send_message(&self, text: &str) -> Result<(), SinkError> {
        self.tx
            .send(text.to_string())
            .map_err(|_| SinkError::Disconnected("provider channel closed".to_string()))?;
        self.send_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Accepts and drops every message. Used by the replay binary.
pub struct NullSink {
    send_count: AtomicUsize,
}

impl NullSink {
    pub fn new() -> Self {
        Self {
            send_count: AtomicUsize::new(0),
        }
    }

    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::Relaxed)
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn send_message(&self, text: &str) -> Result<(), SinkError> {
        self.send_count.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("NullSink dropped outbound message ({} chars)", text.len());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}
