//! Settings snapshot and persistence
//!
//! Settings live in a flat key/value store (see [`SettingsStore`]) using the
//! keys in [`keys`]. Absent keys fall back to the defaults table, and the two
//! extraction-mode flags are normalized so exactly one mode is active.

use crate::decoders::DecoderKind;
use crate::error::{GrepxError, Result};
use serde::Serialize;
use std::path::PathBuf;

mod store;
mod validator;

pub use store::{MemoryStore, SettingsStore, TomlFileStore};
pub use validator::ConfigValidator;

/// Lower bound for the annotation length
pub const MIN_OUTPUT_LENGTH: usize = 1;
/// Upper bound for the annotation length
pub const MAX_OUTPUT_LENGTH: usize = 20_000;
/// Used whenever the stored length is missing, unparsable or out of range
pub const DEFAULT_OUTPUT_LENGTH: usize = 300;

pub const DEFAULT_START_MARKER: &str = "Set-Cookie: cognito-fl=\"";
pub const DEFAULT_END_MARKER: &str = "\";";
pub const DEFAULT_PATTERN: &str = r#"Set-Cookie:\s*cognito-fl="([^"]+)""#;

/// Persisted setting keys
pub mod keys {
    pub const BETWEEN_ON: &str = "betweenOn";
    pub const START_AFTER: &str = "startAfter";
    pub const END_AT: &str = "endAt";
    pub const REGEX_ON: &str = "regexOn";
    pub const REGEX: &str = "regex";
    pub const CASE: &str = "case";
    pub const DECODER: &str = "decoder";
    pub const IN_HEADERS: &str = "inHdrs";
    pub const IN_BODY: &str = "inBody";
    pub const MAX_OUT: &str = "maxOut";
    pub const REPLACE: &str = "replace";
    pub const HIGHLIGHT: &str = "doHl";
    pub const ENABLE: &str = "enable";

    pub const ALL: [&str; 13] = [
        BETWEEN_ON,
        START_AFTER,
        END_AT,
        REGEX_ON,
        REGEX,
        CASE,
        DECODER,
        IN_HEADERS,
        IN_BODY,
        MAX_OUT,
        REPLACE,
        HIGHLIGHT,
        ENABLE,
    ];
}

/// Active extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Text between a start marker and an end delimiter
    #[default]
    Between,
    /// Capture group 1 of a regular expression
    Regex,
}

/// Raw on/off state of the two mode toggles, as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    pub between: bool,
    pub regex: bool,
}

impl ModeFlags {
    /// Resolve the flags to a single mode: regex wins a conflict, between is the fallback
    pub fn normalize(self) -> ExtractionMode {
        if self.regex {
            if self.between {
                tracing::debug!("both extraction modes enabled, keeping regex");
            }
            ExtractionMode::Regex
        } else {
            ExtractionMode::Between
        }
    }
}

impl From<ExtractionMode> for ModeFlags {
    fn from(mode: ExtractionMode) -> Self {
        Self {
            between: mode == ExtractionMode::Between,
            regex: mode == ExtractionMode::Regex,
        }
    }
}

/// Immutable snapshot of the decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub mode: ExtractionMode,
    pub start_marker: String,
    pub end_marker: String,
    pub pattern: String,
    pub case_sensitive: bool,
    pub decoder: DecoderKind,
    pub search_headers: bool,
    pub search_body: bool,
    pub max_output_length: usize,
    pub replace_existing_comment: bool,
    pub highlight_enabled: bool,
    pub live_decode_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Between,
            start_marker: DEFAULT_START_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            case_sensitive: false,
            decoder: DecoderKind::AutoBase64,
            search_headers: true,
            search_body: false,
            max_output_length: DEFAULT_OUTPUT_LENGTH,
            replace_existing_comment: true,
            highlight_enabled: true,
            live_decode_enabled: true,
        }
    }
}

impl Settings {
    /// Build a snapshot from a store, using defaults for anything missing or unusable
    pub fn load(store: &impl SettingsStore) -> Self {
        let mut settings = Self::default();

        let flags = ModeFlags {
            between: store.load(keys::BETWEEN_ON).map_or(true, |v| parse_flag(&v)),
            regex: store.load(keys::REGEX_ON).map_or(false, |v| parse_flag(&v)),
        };
        settings.mode = flags.normalize();

        for key in keys::ALL {
            if key == keys::BETWEEN_ON || key == keys::REGEX_ON {
                continue;
            }
            if let Some(value) = store.load(key) {
                settings.apply_stored(key, &value);
            }
        }

        settings
    }

    /// Write every setting to `store` and flush it
    pub fn save(&self, store: &mut impl SettingsStore) -> Result<()> {
        for (key, value) in self.to_pairs() {
            store.save(key, &value)?;
        }
        store.flush()
    }

    /// All settings as stored key/value pairs
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let flags = ModeFlags::from(self.mode);
        vec![
            (keys::BETWEEN_ON, flag(flags.between)),
            (keys::START_AFTER, self.start_marker.clone()),
            (keys::END_AT, self.end_marker.clone()),
            (keys::REGEX_ON, flag(flags.regex)),
            (keys::REGEX, self.pattern.clone()),
            (keys::CASE, flag(self.case_sensitive)),
            (keys::DECODER, self.decoder.name().to_string()),
            (keys::IN_HEADERS, flag(self.search_headers)),
            (keys::IN_BODY, flag(self.search_body)),
            (keys::MAX_OUT, self.max_output_length.to_string()),
            (keys::REPLACE, flag(self.replace_existing_comment)),
            (keys::HIGHLIGHT, flag(self.highlight_enabled)),
            (keys::ENABLE, flag(self.live_decode_enabled)),
        ]
    }

    /// Stored value for a single key
    pub fn get(&self, key: &str) -> Option<String> {
        self.to_pairs()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Change one setting, rejecting values that cannot be represented
    ///
    /// The mode toggles behave like linked checkboxes: turning one on turns the
    /// other off, and between cannot be switched off unless regex is on.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            keys::BETWEEN_ON => {
                if strict_flag(key, value)? {
                    self.mode = ExtractionMode::Between;
                }
            }
            keys::REGEX_ON => {
                self.mode = if strict_flag(key, value)? {
                    ExtractionMode::Regex
                } else {
                    ExtractionMode::Between
                };
            }
            keys::START_AFTER => self.start_marker = value.to_string(),
            keys::END_AT => self.end_marker = value.to_string(),
            keys::REGEX => self.pattern = value.to_string(),
            keys::CASE => self.case_sensitive = strict_flag(key, value)?,
            keys::DECODER => {
                self.decoder = value.parse().map_err(|_| GrepxError::InvalidConfigValue {
                    path: key.to_string(),
                    message: format!("Unknown decoder '{}'", value),
                })?;
            }
            keys::IN_HEADERS => self.search_headers = strict_flag(key, value)?,
            keys::IN_BODY => self.search_body = strict_flag(key, value)?,
            keys::MAX_OUT => self.max_output_length = parse_max_output(value),
            keys::REPLACE => self.replace_existing_comment = strict_flag(key, value)?,
            keys::HIGHLIGHT => self.highlight_enabled = strict_flag(key, value)?,
            keys::ENABLE => self.live_decode_enabled = strict_flag(key, value)?,
            _ => {
                return Err(GrepxError::InvalidConfigValue {
                    path: key.to_string(),
                    message: "Unknown setting key".to_string(),
                })
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: GREPX_<KEY>=value, e.g. GREPX_DECODER=hex
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply `GREPX_<KEY>` overrides from an arbitrary variable list
    pub fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (name, value) in vars {
            let Some(suffix) = name.strip_prefix("GREPX_") else {
                continue;
            };
            let Some(key) = keys::ALL
                .iter()
                .find(|k| k.eq_ignore_ascii_case(suffix))
            else {
                tracing::debug!("Unknown env setting key: {}", suffix);
                continue;
            };
            if let Err(e) = self.set(key, &value) {
                tracing::warn!("Failed to apply env override {}: {}", name, e);
            }
        }
    }

    /// Get the default settings file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GrepxError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("grepx").join("settings.toml"))
    }

    // Stored values are read leniently: anything unusable keeps the default.
    fn apply_stored(&mut self, key: &str, value: &str) {
        match key {
            keys::DECODER => match value.parse() {
                Ok(decoder) => self.decoder = decoder,
                Err(_) => tracing::warn!("Unknown stored decoder '{}', using default", value),
            },
            keys::START_AFTER => self.start_marker = value.to_string(),
            keys::END_AT => self.end_marker = value.to_string(),
            keys::REGEX => self.pattern = value.to_string(),
            keys::MAX_OUT => self.max_output_length = parse_max_output(value),
            _ => {
                if let Err(e) = self.set(key, &flag(parse_flag(value))) {
                    tracing::warn!("Ignoring stored value for {}: {}", key, e);
                }
            }
        }
    }
}

/// Parse a stored max length; anything outside [1, 20000] falls back to 300
pub fn parse_max_output(raw: &str) -> usize {
    raw.trim()
        .parse::<usize>()
        .map_or(DEFAULT_OUTPUT_LENGTH, bound_output_length)
}

/// Keep a max length inside [1, 20000], using 300 for anything outside
pub fn bound_output_length(len: usize) -> usize {
    if (MIN_OUTPUT_LENGTH..=MAX_OUTPUT_LENGTH).contains(&len) {
        len
    } else {
        DEFAULT_OUTPUT_LENGTH
    }
}

fn flag(on: bool) -> String {
    let value = if on { "1" } else { "0" };
    value.to_string()
}

fn parse_flag(value: &str) -> bool {
    value.trim() == "1"
}

fn strict_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(GrepxError::InvalidConfigValue {
            path: key.to_string(),
            message: format!("Cannot parse '{}' as boolean", value),
        }),
    }
}
