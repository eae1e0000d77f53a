use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub vocabulary: VocabularyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Burst coalescing window for transcription batches, in milliseconds.
    /// 0 disables coalescing; recomputation then runs on every batch.
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            coalesce_window_ms: default_coalesce_window_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_local_speaker_id")]
    pub local_speaker_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_speaker_id: default_local_speaker_id(),
        }
    }
}

/// Phrase lists and patterns driving the order extractor. Treated as
/// configuration so deployments/themes can swap them without code changes.
#[derive(Debug, Deserialize, Clone)]
pub struct VocabularyConfig {
    #[serde(default = "default_completion_phrases")]
    pub completion_phrases: Vec<String>,

    #[serde(default = "default_item_types")]
    pub item_types: Vec<String>,

    #[serde(default = "default_sizes")]
    pub sizes: Vec<String>,

    #[serde(default = "default_variants")]
    pub variants: Vec<String>,

    #[serde(default = "default_extras")]
    pub extras: Vec<String>,

    #[serde(default = "default_order_id_pattern")]
    pub order_id_pattern: String,

    #[serde(default = "default_name_pattern")]
    pub name_pattern: String,

    #[serde(default = "default_name_min_len")]
    pub name_min_len: usize,

    #[serde(default = "default_name_max_len")]
    pub name_max_len: usize,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            completion_phrases: default_completion_phrases(),
            item_types: default_item_types(),
            sizes: default_sizes(),
            variants: default_variants(),
            extras: default_extras(),
            order_id_pattern: default_order_id_pattern(),
            name_pattern: default_name_pattern(),
            name_min_len: default_name_min_len(),
            name_max_len: default_name_max_len(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_coalesce_window_ms() -> u64 {
    25
}

fn default_local_speaker_id() -> String {
    "user".to_string()
}

fn default_completion_phrases() -> Vec<String> {
    vec![
        "order has been saved".to_string(),
        "order number".to_string(),
    ]
}

fn default_item_types() -> Vec<String> {
    [
        "latte",
        "cappuccino",
        "espresso",
        "americano",
        "mocha",
        "flat white",
        "cold brew",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sizes() -> Vec<String> {
    ["small", "medium", "large", "grande"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_variants() -> Vec<String> {
    [
        "whole milk",
        "oat milk",
        "almond milk",
        "skim milk",
        "soy milk",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extras() -> Vec<String> {
    [
        "whipped cream",
        "extra shot",
        "vanilla syrup",
        "caramel syrup",
        "hazelnut syrup",
        "chocolate drizzle",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_order_id_pattern() -> String {
    r"order number (\d+)".to_string()
}

fn default_name_pattern() -> String {
    r"saved,?\s+(?:for\s+)?(\w+)".to_string()
}

fn default_name_min_len() -> usize {
    2
}

fn default_name_max_len() -> usize {
    19
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}
