use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use convomux_core::{AppConfig, ChatMessage, ExtractError, SessionSnapshot, SinkError};
use convomux_extract::OrderExtractor;
use convomux_transcript::{merge, SegmentStore};
use tokio::sync::{mpsc, watch};

use crate::event::SessionEvent;
use crate::sink::ChatSink;

/// Per-session engine state. Mutated only inside the host loop task, one
/// event at a time; the merger and extractor run as pure passes over it.
struct EngineState {
    store: SegmentStore,
    chat: Vec<ChatMessage>,
    chat_ids: HashSet<String>,
    extractor: OrderExtractor,
    local_speaker_id: String,
    is_live: bool,
}

impl EngineState {
    fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Transcription {
                speaker_id,
                segments,
            } => self.store.apply_batch(&segments, &speaker_id),
            SessionEvent::Chat(msg) => {
                // Inbound chat is at-most-once per id; repeats are ignored
                if msg.id.is_empty() || self.chat_ids.contains(&msg.id) {
                    return false;
                }
                self.chat_ids.insert(msg.id.clone());
                self.chat.push(msg);
                true
            }
            SessionEvent::SessionStart => {
                self.reset();
                self.is_live = true;
                true
            }
            SessionEvent::SessionEnd => {
                self.reset();
                self.is_live = false;
                true
            }
        }
    }

    fn reset(&mut self) {
        self.store.clear();
        self.chat.clear();
        self.chat_ids.clear();
        self.extractor.reset();
    }

    fn snapshot(&mut self) -> SessionSnapshot {
        let entries = merge(&self.store.segments(), &self.chat, &self.local_speaker_id);
        let order = self.extractor.observe(&entries).clone();
        SessionSnapshot {
            entries,
            order,
            is_live: self.is_live,
        }
    }
}

/// Owns one live session's reconciliation state.
///
/// Events are pushed through the sender handed out by
/// [`event_sender`](Self::event_sender) and consumed serially by the loop
/// task; a fresh [`SessionSnapshot`] is broadcast to subscribers after each
/// recomputation. Bursts of transcription batches are coalesced within the
/// configured window: every batch is applied, only the recompute is
/// deferred. Dropping all event senders halts the loop; there is no other
/// in-flight work to cancel.
pub struct SessionHost {
    event_tx: Option<mpsc::UnboundedSender<SessionEvent>>,
    event_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    state_tx: Option<watch::Sender<SessionSnapshot>>,
    state_rx: watch::Receiver<SessionSnapshot>,
    sink: Arc<dyn ChatSink>,
    engine: Option<EngineState>,
    coalesce_window: Duration,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl SessionHost {
    pub fn new(config: &AppConfig, sink: Arc<dyn ChatSink>) -> Result<Self, ExtractError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());

        let engine = EngineState {
            store: SegmentStore::new(),
            chat: Vec::new(),
            chat_ids: HashSet::new(),
            extractor: OrderExtractor::from_config(&config.vocabulary)?,
            local_speaker_id: config.session.local_speaker_id.clone(),
            is_live: false,
        };

        Ok(Self {
            event_tx: Some(event_tx),
            event_rx: Some(event_rx),
            state_tx: Some(state_tx),
            state_rx,
            sink,
            engine: Some(engine),
            coalesce_window: Duration::from_millis(config.general.coalesce_window_ms),
            task_handle: None,
        })
    }

    /// Sender the provider binding pushes inbound events into.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.event_tx
            .as_ref()
            .expect("event_sender() called after shutdown")
            .clone()
    }

    /// Snapshot receiver; a new value is published after each recomputation.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Forward an outbound chat message to the provider. Failures are
    /// returned to the caller; engine state is never touched either way.
    pub async fn send_chat(&self, text: &str) -> Result<(), SinkError> {
        self.sink.send_message(text).await
    }

    pub fn start(&mut self) {
        let mut rx = self
            .event_rx
            .take()
            .expect("start() called but receiver already taken");
        let state_tx = self
            .state_tx
            .take()
            .expect("start() called but state sender already taken");
        let mut engine = self.engine.take().expect("engine already taken");
        let window = self.coalesce_window;

        let handle = tokio::spawn(async move {
            let mut closed = false;
            while !closed {
                let Some(event) = rx.recv().await else {
                    break;
                };
                let mut dirty = engine.apply(event);

                if !window.is_zero() {
                    // Drain the rest of the burst; the window bounds the
                    // total deferral from the first event, not each gap.
                    let deadline = tokio::time::Instant::now() + window;
                    loop {
                        match tokio::time::timeout_at(deadline, rx.recv()).await {
                            Ok(Some(event)) => dirty |= engine.apply(event),
                            Ok(None) => {
                                closed = true;
                                break;
                            }
                            Err(_) => break,
                        }
                    }
                }

                if dirty {
                    let _ = state_tx.send(engine.snapshot());
                }
            }
            tracing::debug!("session host loop stopped");
        });
        self.task_handle = Some(handle);
    }

    pub async fn shutdown(&mut self) {
        // Drop our sender so the loop ends once external senders are gone
        self.event_tx.take();
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }
}
