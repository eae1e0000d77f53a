use std::collections::HashSet;

use convomux_core::{ChatMessage, EntrySource, Segment, TranscriptEntry};

/// Merge current segments and the chat history into one time-ordered view.
///
/// Pure function of its inputs: no hidden state, no clock reads. Entries are
/// sorted by timestamp ascending; on ties, transcript-derived entries come
/// before chat-derived ones so interim speech stays visible ahead of a
/// simultaneous discrete message. When both streams carry the same `id` the
/// chat entry wins (the provider promotes finalized segments into chat
/// messages). Records with an empty id or negative timestamp are dropped so
/// subscribers always receive a renderable sequence.
pub fn merge(
    segments: &[Segment],
    chat: &[ChatMessage],
    local_speaker_id: &str,
) -> Vec<TranscriptEntry> {
    let chat_ids: HashSet<&str> = chat
        .iter()
        .filter(|m| !m.id.is_empty())
        .map(|m| m.id.as_str())
        .collect();

    let mut entries: Vec<TranscriptEntry> = Vec::with_capacity(segments.len() + chat.len());

    for seg in segments {
        if seg.id.is_empty() || seg.created_at < 0 {
            continue;
        }
        if chat_ids.contains(seg.id.as_str()) {
            continue;
        }
        entries.push(TranscriptEntry {
            id: seg.id.clone(),
            timestamp: seg.created_at,
            speaker_id: seg.speaker_id.clone(),
            text: seg.text.clone(),
            is_local_speaker: seg.speaker_id == local_speaker_id,
            source: EntrySource::Transcript,
        });
    }

    for msg in chat {
        if msg.id.is_empty() || msg.timestamp < 0 {
            continue;
        }
        entries.push(TranscriptEntry {
            id: msg.id.clone(),
            timestamp: msg.timestamp,
            speaker_id: msg.speaker_id.clone(),
            text: msg.text.clone(),
            is_local_speaker: msg.speaker_id == local_speaker_id,
            source: EntrySource::Chat,
        });
    }

    // Stable sort: equal (timestamp, rank) keys keep arrival order
    entries.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| source_rank(a.source).cmp(&source_rank(b.source)))
    });
    entries
}

fn source_rank(source: EntrySource) -> u8 {
    match source {
        EntrySource::Transcript => 0,
        EntrySource::Chat => 1,
    }
}
