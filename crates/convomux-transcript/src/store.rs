use std::collections::HashMap;

use convomux_core::{Segment, UNKNOWN_SPEAKER};

/// Holds the latest known revision of every in-flight transcription segment.
///
/// Revisions for one `id` replace the stored record wholesale; fields are
/// never merged. A shorter partial arriving after a longer one is stale and
/// rejected, but a final revision is always accepted even when shorter.
/// Finality is sticky: once a segment is final, non-final revisions for that
/// id can no longer regress it.
pub struct SegmentStore {
    segments: HashMap<String, Segment>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self {
            segments: HashMap::new(),
        }
    }

    /// Apply one transcription batch attributed to `speaker_id`.
    /// Returns `true` if any stored record changed.
    pub fn apply_batch(&mut self, batch: &[Segment], speaker_id: &str) -> bool {
        let mut changed = false;

        for incoming in batch {
            if incoming.id.is_empty() {
                tracing::debug!("dropping transcription segment with empty id");
                continue;
            }

            let speaker = resolve_speaker(&incoming.speaker_id, speaker_id);

            match self.segments.get(&incoming.id) {
                None => {
                    self.segments.insert(
                        incoming.id.clone(),
                        Segment {
                            id: incoming.id.clone(),
                            text: incoming.text.clone(),
                            created_at: incoming.created_at,
                            speaker_id: speaker,
                            is_final: incoming.is_final,
                        },
                    );
                    changed = true;
                }
                Some(stored) => {
                    // Finality is sticky per id
                    if stored.is_final && !incoming.is_final {
                        tracing::trace!(
                            segment_id = %incoming.id,
                            "ignoring non-final revision of a finalized segment"
                        );
                        continue;
                    }

                    let accept =
                        incoming.text.len() >= stored.text.len() || incoming.is_final;
                    if !accept {
                        tracing::trace!(
                            segment_id = %incoming.id,
                            "ignoring stale shorter revision"
                        );
                        continue;
                    }

                    let replacement = Segment {
                        id: incoming.id.clone(),
                        text: incoming.text.clone(),
                        // First observation wins; revisions never move a segment
                        created_at: stored.created_at,
                        speaker_id: speaker,
                        is_final: stored.is_final || incoming.is_final,
                    };
                    if &replacement != stored {
                        self.segments.insert(incoming.id.clone(), replacement);
                        changed = true;
                    }
                }
            }
        }

        changed
    }

    /// Current records, sorted by `(created_at, id)` for deterministic output.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out: Vec<Segment> = self.segments.values().cloned().collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    pub fn get(&self, id: &str) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop all state (session teardown/reconnect).
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_speaker(segment_speaker: &str, batch_speaker: &str) -> String {
    if !segment_speaker.is_empty() {
        segment_speaker.to_string()
    } else if !batch_speaker.is_empty() {
        batch_speaker.to_string()
    } else {
        UNKNOWN_SPEAKER.to_string()
    }
}
