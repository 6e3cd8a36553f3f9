//! Caller phone number extraction from email subject lines.
//!
//! Recognises an optional leading `+1` country code followed by a North
//! American number in 3+3+4 digit groups, with or without parentheses,
//! dashes, dots and spaces between the groups.

use regex::Regex;
use std::sync::LazyLock;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)\+?1?\s*\(?(\d{3})\)?[-.\s]?(\d{3})[-.\s]?(\d{4})")
        .expect("phone pattern is valid")
});

/// Digit groups of a matched number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneParts<'a> {
    pub area: &'a str,
    pub exchange: &'a str,
    pub line: &'a str,
}

impl PhoneParts<'_> {
    /// `(AAA) BBB-CCCC`.
    pub fn format(&self) -> String {
        format!("({}) {}-{}", self.area, self.exchange, self.line)
    }
}

/// A fixed replacement for specific callers, checked before formatting.
#[derive(Debug, Clone)]
pub struct CallerOverride {
    pub area: &'static str,
    pub line_suffix: &'static str,
    pub replacement: &'static str,
}

impl CallerOverride {
    fn applies_to(&self, parts: &PhoneParts<'_>) -> bool {
        parts.area == self.area && parts.line.ends_with(self.line_suffix)
    }
}

/// The one caller the household would rather not hear from.
pub const UNWANTED_CALLER: CallerOverride = CallerOverride {
    area: "704",
    line_suffix: "90",
    replacement: "I HATE THIS MAN",
};

/// Phone number extractor with an optional list of caller overrides.
#[derive(Debug, Clone)]
pub struct PhoneExtractor {
    overrides: Vec<CallerOverride>,
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self {
            overrides: vec![UNWANTED_CALLER],
        }
    }
}

impl PhoneExtractor {
    /// Extractor that always returns the formatted number.
    pub fn without_overrides() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Extract and format the first phone number in `text`.
    ///
    /// Returns an empty string when nothing matches.
    pub fn extract(&self, text: &str) -> String {
        let Some(parts) = match_parts(text) else {
            return String::new();
        };

        self.overrides
            .iter()
            .find(|rule| rule.applies_to(&parts))
            .map(|rule| rule.replacement.to_string())
            .unwrap_or_else(|| parts.format())
    }
}

/// Locate the first phone number in `text` and split it into groups.
pub fn match_parts(text: &str) -> Option<PhoneParts<'_>> {
    let caps = PHONE_PATTERN.captures(text)?;
    Some(PhoneParts {
        area: caps.get(1)?.as_str(),
        exchange: caps.get(2)?.as_str(),
        line: caps.get(3)?.as_str(),
    })
}

/// Extract a phone number using the default rules.
pub fn extract_phone_number(text: &str) -> String {
    PhoneExtractor::default().extract(text)
}
