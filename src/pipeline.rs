//! Extraction → sanitize → decode → truncate
//!
//! A missing candidate is silent (`None`); a decode failure is visible as a
//! `<decode error: ...>` diagnostic so the user sees why in the results table.

use crate::config::{bound_output_length, Settings};
use crate::decoders::{DecodeError, DecoderKind};
use crate::extractor::{ExtractorSlot, Haystack};
use serde::Serialize;
use std::fmt;

/// Result of decoding one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum DecodeOutcome {
    /// Decoded text, already truncated
    Decoded(String),
    /// Diagnostic in the form `<decode error: {message}>`
    Failed(String),
}

impl DecodeOutcome {
    pub fn failure(error: &DecodeError) -> Self {
        DecodeOutcome::Failed(format!("<decode error: {}>", error))
    }

    /// Text written as the annotation
    pub fn text(&self) -> &str {
        match self {
            DecodeOutcome::Decoded(text) | DecodeOutcome::Failed(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DecodeOutcome::Failed(_))
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Decoding pipeline with a cached compiled extractor
#[derive(Debug, Default)]
pub struct Pipeline {
    extractors: ExtractorSlot,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the pipeline for one response
    ///
    /// Returns `None` when nothing was extracted.
    pub fn run(&self, haystack: &Haystack, settings: &Settings) -> Option<DecodeOutcome> {
        if haystack.is_empty() {
            return None;
        }

        let extractor = self.extractors.get(settings);
        let Some(candidate) = extractor.extract(haystack) else {
            tracing::debug!("no candidate found");
            return None;
        };

        Some(decode_candidate(
            candidate,
            settings.decoder,
            settings.max_output_length,
        ))
    }

    /// Force recompilation, e.g. right after the settings were edited
    pub fn reconfigure(&self, settings: &Settings) {
        self.extractors.reconfigure(settings);
    }
}

/// Sanitize and decode a candidate, truncating successful output to `max_chars`
///
/// `max_chars` outside [1, 20000] is replaced by the default of 300.
pub fn decode_candidate(candidate: &str, decoder: DecoderKind, max_chars: usize) -> DecodeOutcome {
    let max_chars = bound_output_length(max_chars);
    match decoder.decode_to_text(candidate) {
        Ok(text) => DecodeOutcome::Decoded(truncate_chars(&text, max_chars)),
        Err(e) => {
            tracing::debug!("{} failed: {}", decoder, e);
            DecodeOutcome::failure(&e)
        }
    }
}

/// Hard cut after `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
