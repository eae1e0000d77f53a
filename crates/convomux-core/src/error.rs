use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown event type: {0}")]
    UnknownType(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to send message: {0}")]
    SendFailed(String),

    #[error("sink disconnected: {0}")]
    Disconnected(String),
}
