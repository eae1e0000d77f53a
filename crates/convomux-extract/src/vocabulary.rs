//! Compiled extraction vocabulary.
//!
//! Phrase lists and patterns come from configuration so deployments can swap
//! the catalog per theme; compilation happens once, matching is plain
//! substring/regex work after that.

use convomux_core::{ExtractError, VocabularyConfig};
use regex::Regex;

pub struct Vocabulary {
    completion_phrases: Vec<String>,
    item_types: Vec<String>,
    sizes: Vec<String>,
    variants: Vec<String>,
    extras: Vec<String>,
    order_id_re: Regex,
    name_re: Regex,
    name_min_len: usize,
    name_max_len: usize,
}

impl Vocabulary {
    /// Compile the configured vocabulary. Invalid patterns fail here, never
    /// during extraction.
    pub fn compile(config: &VocabularyConfig) -> Result<Self, ExtractError> {
        let order_id_re = compile_insensitive(&config.order_id_pattern, "order_id")?;
        let name_re = compile_insensitive(&config.name_pattern, "name")?;

        Ok(Self {
            completion_phrases: lowercase_all(&config.completion_phrases),
            item_types: lowercase_all(&config.item_types),
            sizes: lowercase_all(&config.sizes),
            variants: lowercase_all(&config.variants),
            extras: lowercase_all(&config.extras),
            order_id_re,
            name_re,
            name_min_len: config.name_min_len,
            name_max_len: config.name_max_len,
        })
    }

    /// Whether lowercased `text` contains any completion phrase.
    pub fn is_completion(&self, text: &str) -> bool {
        self.completion_phrases.iter().any(|p| text.contains(p.as_str()))
    }

    /// First identifier captured from the confirming message, if any.
    pub fn match_order_id(&self, text: &str) -> Option<String> {
        self.order_id_re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Name captured from the confirming message's trailing clause, if any.
    pub fn match_name(&self, text: &str) -> Option<String> {
        self.name_re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Whether `word` is plausible as a customer name.
    pub fn name_length_plausible(&self, word: &str) -> bool {
        let len = word.chars().count();
        len >= self.name_min_len && len <= self.name_max_len
    }

    pub fn item_types(&self) -> &[String] {
        &self.item_types
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }
}

fn compile_insensitive(pattern: &str, field: &'static str) -> Result<Regex, ExtractError> {
    Regex::new(&format!("(?i){pattern}"))
        .map_err(|source| ExtractError::InvalidPattern { field, source })
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_vocab() -> Vocabulary {
        Vocabulary::compile(&VocabularyConfig::default()).unwrap()
    }

    #[test]
    fn test_vocabulary_compiles_defaults() {
        let vocab = default_vocab();
        assert!(vocab.item_types().contains(&"latte".to_string()));
        assert!(vocab.sizes().contains(&"grande".to_string()));
    }

    #[test]
    fn test_vocabulary_completion_phrase_matches() {
        let vocab = default_vocab();
        assert!(vocab.is_completion("great, your order has been saved!"));
        assert!(vocab.is_completion("order number 17 is on its way"));
        assert!(!vocab.is_completion("what can I get you today?"));
    }

    #[test]
    fn test_vocabulary_order_id_capture() {
        let vocab = default_vocab();
        assert_eq!(
            vocab.match_order_id("Thanks! Order number 482 has been saved."),
            Some("482".to_string())
        );
        assert_eq!(vocab.match_order_id("your order has been saved"), None);
    }

    #[test]
    fn test_vocabulary_name_capture_with_for() {
        let vocab = default_vocab();
        assert_eq!(
            vocab.match_name("order number 482 has been saved for Sam"),
            Some("Sam".to_string())
        );
    }

    #[test]
    fn test_vocabulary_name_capture_comma_form() {
        let vocab = default_vocab();
        assert_eq!(
            vocab.match_name("your order has been saved, Priya!"),
            Some("Priya".to_string())
        );
    }

    #[test]
    fn test_vocabulary_name_length_bounds() {
        let vocab = default_vocab();
        assert!(!vocab.name_length_plausible("J"));
        assert!(vocab.name_length_plausible("Jo"));
        assert!(vocab.name_length_plausible("Bartholomew-Quincy"));
        assert!(!vocab.name_length_plausible("thisisnotaplausiblename"));
    }

    #[test]
    fn test_vocabulary_lists_lowercased() {
        let config = VocabularyConfig {
            item_types: vec!["Flat White".to_string()],
            ..VocabularyConfig::default()
        };
        let vocab = Vocabulary::compile(&config).unwrap();
        assert_eq!(vocab.item_types(), &["flat white".to_string()][..]);
    }

    #[test]
    fn test_vocabulary_invalid_pattern_fails_compile() {
        let config = VocabularyConfig {
            order_id_pattern: "([unclosed".to_string(),
            ..VocabularyConfig::default()
        };
        let err = Vocabulary::compile(&config).unwrap_err();
        assert!(err.to_string().contains("order_id"));
    }

    #[test]
    fn test_vocabulary_custom_theme() {
        let config = VocabularyConfig {
            completion_phrases: vec!["ticket confirmed".to_string()],
            order_id_pattern: r"ticket (\d+)".to_string(),
            ..VocabularyConfig::default()
        };
        let vocab = Vocabulary::compile(&config).unwrap();
        assert!(vocab.is_completion("ticket confirmed. see you soon"));
        assert_eq!(vocab.match_order_id("Ticket 77 confirmed"), Some("77".to_string()));
    }
}
