//! Error types for the JARVIS assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Transcription service answered with an error status
    #[error("STT error: Whisper API error {status}: {body}")]
    SttRejected {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Credential store error
    #[error("credential error: {0}")]
    Credential(String),

    /// Failed to open an application URL
    #[error("open url error: {0}")]
    OpenUrl(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
