//! Fixed on-disk locations and external endpoints.
//!
//! These are deliberately not part of [`Settings`](super::Settings).

/// Root data directory.
pub const DATA_DIR: &str = "./data";

/// Directory holding persisted audio attachments, named `<id>.mp3`.
pub const ATTACHMENT_DIR: &str = "./data/mp3s";

/// SQLite store location.
pub const DB_PATH: &str = "./data/recordings.db";

/// Audio transcoder binary.
pub const FFMPEG_BIN: &str = "ffmpeg";

/// whisper.cpp command-line binary.
pub const WHISPER_CLI: &str = "../whisper.cpp/build/bin/whisper-cli";

/// whisper.cpp model file.
pub const WHISPER_MODEL: &str = "../whisper.cpp/models/ggml-base.en.bin";

/// OpenAI-compatible base URL of the local title service (Ollama).
pub const TITLE_API_BASE: &str = "http://localhost:11434/v1";
