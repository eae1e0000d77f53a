use convomux_core::{ChatMessage, EventError, Segment, UNKNOWN_SPEAKER};
use serde::Deserialize;

/// Typed inbound session event, validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Transcription {
        speaker_id: String,
        segments: Vec<Segment>,
    },
    Chat(ChatMessage),
    SessionStart,
    SessionEnd,
}

#[derive(Debug, Deserialize)]
struct WireTranscription {
    #[serde(default)]
    speaker_id: Option<String>,
    #[serde(default)]
    segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
struct WireSegment {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    speaker_id: Option<String>,
    #[serde(default)]
    is_final: bool,
}

#[derive(Debug, Deserialize)]
struct WireChatMessage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    speaker_id: Option<String>,
    #[serde(default)]
    text: String,
}

/// Decode one wire event (JSON object with a `type` tag).
///
/// Undecodable envelopes and unknown types are typed errors. Individual
/// malformed records (missing id or timestamp) are dropped and logged, never
/// propagated: a chat event whose one record is malformed decodes to
/// `Ok(None)`, a transcription event just loses the bad segments.
pub fn decode_event(input: &str) -> Result<Option<SessionEvent>, EventError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let event_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    match event_type.as_str() {
        "transcription" => {
            let wire: WireTranscription = serde_json::from_value(value)?;
            let speaker_id = wire.speaker_id.unwrap_or_default();
            let segments = wire
                .segments
                .into_iter()
                .filter_map(|s| validate_segment(s, &speaker_id))
                .collect();
            Ok(Some(SessionEvent::Transcription {
                speaker_id,
                segments,
            }))
        }
        "chat_message" => {
            let wire: WireChatMessage = serde_json::from_value(value)?;
            let (Some(id), Some(timestamp)) = (wire.id, wire.timestamp) else {
                tracing::debug!("dropping chat message with missing id or timestamp");
                return Ok(None);
            };
            if id.is_empty() {
                tracing::debug!("dropping chat message with empty id");
                return Ok(None);
            }
            Ok(Some(SessionEvent::Chat(ChatMessage {
                id,
                timestamp,
                speaker_id: resolve_speaker(wire.speaker_id),
                text: wire.text,
            })))
        }
        "session_start" => Ok(Some(SessionEvent::SessionStart)),
        "session_end" => Ok(Some(SessionEvent::SessionEnd)),
        other => Err(EventError::UnknownType(other.to_string())),
    }
}

fn validate_segment(wire: WireSegment, batch_speaker: &str) -> Option<Segment> {
    let (Some(id), Some(created_at)) = (wire.id, wire.created_at) else {
        tracing::debug!("dropping segment with missing id or created_at");
        return None;
    };
    if id.is_empty() {
        tracing::debug!("dropping segment with empty id");
        return None;
    }
    let speaker_id = match wire.speaker_id {
        Some(s) if !s.is_empty() => s,
        _ if !batch_speaker.is_empty() => batch_speaker.to_string(),
        _ => UNKNOWN_SPEAKER.to_string(),
    };
    Some(Segment {
        id,
        text: wire.text,
        created_at,
        speaker_id,
        is_final: wire.is_final,
    })
}

fn resolve_speaker(speaker: Option<String>) -> String {
    match speaker {
        Some(s) if !s.is_empty() => s,
        _ => UNKNOWN_SPEAKER.to_string(),
    }
}
