use convomux_core::{ExtractError, OrderState, TranscriptEntry, VocabularyConfig};

use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collecting,
    Complete,
}

/// Derives structured order state from the merged transcript.
///
/// Stays in `Collecting`, returning a neutral state and doing no scanning,
/// until the most recent non-local entry carries a completion phrase. The
/// transition to `Complete` is terminal: the full transcript is scanned once,
/// the result replaces any prior state wholesale, and later observations
/// return the cached state unchanged.
pub struct OrderExtractor {
    vocab: Vocabulary,
    phase: Phase,
    state: OrderState,
}

impl OrderExtractor {
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            phase: Phase::Collecting,
            state: OrderState::default(),
        }
    }

    pub fn from_config(config: &VocabularyConfig) -> Result<Self, ExtractError> {
        Ok(Self::new(Vocabulary::compile(config)?))
    }

    /// Observe the current merged transcript and return the derived state.
    /// Never errors; unmatched fields stay at their defaults.
    pub fn observe(&mut self, entries: &[TranscriptEntry]) -> &OrderState {
        if self.phase == Phase::Complete {
            return &self.state;
        }

        let Some(confirming) = entries.iter().rev().find(|e| !e.is_local_speaker) else {
            return &self.state;
        };
        if !self.vocab.is_completion(&confirming.text.to_lowercase()) {
            return &self.state;
        }

        self.state = self.scan(entries, confirming);
        self.phase = Phase::Complete;
        tracing::debug!(
            order_id = ?self.state.order_id,
            item_type = %self.state.item_type,
            "order extraction complete"
        );
        &self.state
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Drop all derived state (session teardown/reconnect).
    pub fn reset(&mut self) {
        self.phase = Phase::Collecting;
        self.state = OrderState::default();
    }

    /// Full chronological pass over the transcript. First match wins per
    /// field; extras accumulate as a set. Later contradictory mentions are
    /// ignored deliberately.
    fn scan(&self, entries: &[TranscriptEntry], confirming: &TranscriptEntry) -> OrderState {
        let mut order = OrderState {
            order_id: self.vocab.match_order_id(&confirming.text),
            ..OrderState::default()
        };

        for entry in entries {
            let text = entry.text.to_lowercase();

            if order.item_type.is_empty() {
                if let Some(hit) = first_contained(&text, self.vocab.item_types()) {
                    order.item_type = hit;
                }
            }
            if order.size.is_empty() {
                if let Some(hit) = first_contained(&text, self.vocab.sizes()) {
                    order.size = hit;
                }
            }
            if order.variant.is_empty() {
                if let Some(hit) = first_contained(&text, self.vocab.variants()) {
                    order.variant = hit;
                }
            }

            for extra in self.vocab.extras() {
                if text.contains(extra.as_str()) && !order.extras.contains(extra) {
                    order.extras.push(extra.clone());
                }
            }
        }

        // Name: trailing clause of the confirming message first, then the
        // most recent plausible single-word local message as fallback.
        order.customer_name = self
            .vocab
            .match_name(&confirming.text)
            .or_else(|| self.last_single_word_local(entries))
            .unwrap_or_default();

        order.is_complete = true;
        order
    }

    fn last_single_word_local(&self, entries: &[TranscriptEntry]) -> Option<String> {
        entries
            .iter()
            .rev()
            .filter(|e| e.is_local_speaker)
            .find_map(|e| {
                let mut words = e.text.split_whitespace();
                let word = words.next()?;
                if words.next().is_some() {
                    return None;
                }
                self.vocab
                    .name_length_plausible(word)
                    .then(|| word.to_string())
            })
    }
}

fn first_contained(text: &str, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|c| text.contains(c.as_str()))
        .cloned()
}
