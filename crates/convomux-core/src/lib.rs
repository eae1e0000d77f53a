pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, GeneralConfig, SessionConfig, VocabularyConfig};
pub use error::{ConfigError, EventError, ExtractError, SinkError};
pub use types::{
    ChatMessage, EntrySource, OrderState, Segment, SessionSnapshot, TranscriptEntry,
    UNKNOWN_SPEAKER,
};
