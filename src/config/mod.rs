//! Configuration module for Voicebox.
//!
//! Runtime settings come from an optional TOML file; storage paths and
//! external endpoints are fixed constants in [`paths`].

pub mod paths;
mod settings;

pub use settings::{GeneralSettings, ServerSettings, Settings, TitleSettings, TranscriptionSettings};
