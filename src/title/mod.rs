//! Short display titles for transcribed voicemails.

mod canned;
mod local;

pub use canned::CannedTitleGenerator;
pub use local::LocalChatTitleGenerator;

use crate::error::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Title used whenever a real one cannot be produced.
pub const DEFAULT_TITLE: &str = "Untitled Voicemail";

/// Trait for title generation services.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    /// Produce a cleaned, non-empty title for `transcript`.
    async fn generate(&self, transcript: &str) -> Result<String>;
}

/// Generate a title, substituting [`DEFAULT_TITLE`] on any failure.
pub async fn title_or_default(generator: &dyn TitleGenerator, transcript: &str) -> String {
    match generator.generate(transcript).await {
        Ok(title) if !title.trim().is_empty() => {
            info!("Title generated: {}", title);
            title
        }
        Ok(_) => {
            warn!("Title generator returned an empty title");
            DEFAULT_TITLE.to_string()
        }
        Err(e) => {
            warn!("Error generating title: {}", e);
            DEFAULT_TITLE.to_string()
        }
    }
}

/// Normalise raw model output into a bare title.
///
/// Strips surrounding whitespace and quotes, plus a short leading label such
/// as `Title:`. Returns `None` if nothing is left.
pub fn clean_title(raw: &str) -> Option<String> {
    let title = trim_quotes(raw);
    let title = strip_label(title);
    let title = trim_quotes(title);

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn trim_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Drop `Label:` when the label is one or two plain words, or a bare leading colon.
///
/// A label with nothing after it leaves an empty title.
fn strip_label(s: &str) -> &str {
    let Some((label, rest)) = s.split_once(':') else {
        return s;
    };

    let label = label.trim();
    let is_label = label.is_empty()
        || (label.split_whitespace().count() <= 2
            && label.chars().all(|c| c.is_alphabetic() || c.is_whitespace()));

    if is_label {
        rest
    } else {
        s
    }
}
