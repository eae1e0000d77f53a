use serde::Serialize;

/// Sentinel speaker id for segments whose participant cannot be resolved.
pub const UNKNOWN_SPEAKER: &str = "unknown";

/// A unit of incremental speech-to-text output tied to one utterance.
///
/// Segments for the same `id` arrive repeatedly as the recognizer refines its
/// hypothesis; `created_at` is the timestamp of first observation and never
/// changes across revisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    pub text: String,
    pub created_at: i64,
    pub speaker_id: String,
    pub is_final: bool,
}

/// A discrete, already-finalized chat message. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub timestamp: i64,
    pub speaker_id: String,
    pub text: String,
}

/// Which stream a merged entry came from. Transcript entries sort before chat
/// entries sharing a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Transcript,
    Chat,
}

/// One record of the merged, time-ordered transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub timestamp: i64,
    pub speaker_id: String,
    pub text: String,
    pub is_local_speaker: bool,
    pub source: EntrySource,
}

/// Structured order state derived from the transcript. Non-authoritative:
/// recomputed wholesale on each extraction pass, unset fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderState {
    pub item_type: String,
    pub size: String,
    pub variant: String,
    pub extras: Vec<String>,
    pub customer_name: String,
    pub order_id: Option<String>,
    pub is_complete: bool,
}

/// Snapshot broadcast to subscribers after each recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub entries: Vec<TranscriptEntry>,
    pub order: OrderState,
    pub is_live: bool,
}
