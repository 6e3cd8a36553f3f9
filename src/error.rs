//! Error types for Voicebox.

use thiserror::Error;

/// Library-level error type for Voicebox operations.
#[derive(Error, Debug)]
pub enum VoiceboxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Attachment decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Audio conversion failed: {0}")]
    Conversion(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Title generation failed: {0}")]
    Title(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),
}

/// Result type alias for Voicebox operations.
pub type Result<T> = std::result::Result<T, VoiceboxError>;
