//! Candidate extraction
//!
//! Finds the substring to decode in a [`Haystack`], either between two literal
//! markers or as capture group 1 of a regex. Blocks are searched in order and
//! the first block that yields a candidate wins.

mod slot;

use crate::config::{ExtractionMode, Settings};
use regex::{Regex, RegexBuilder};

pub use slot::ExtractorSlot;

/// Text blocks to search, headers block before body block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Haystack {
    blocks: Vec<String>,
}

impl Haystack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block; blocks are searched in insertion order
    pub fn push(&mut self, block: impl Into<String>) {
        self.blocks.push(block.into());
    }

    /// Assemble the haystack for a response according to the search scope
    ///
    /// Header lines are joined with CRLF into a single block.
    pub fn from_response<S: AsRef<str>>(headers: &[S], body: &str, settings: &Settings) -> Self {
        let mut haystack = Self::new();
        if settings.search_headers {
            let joined: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
            haystack.push(joined.join("\r\n"));
        }
        if settings.search_body {
            haystack.push(body);
        }
        haystack
    }

    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Settings fields that determine the compiled extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorKey {
    mode: ExtractionMode,
    start_marker: String,
    end_marker: String,
    pattern: String,
    case_sensitive: bool,
}

impl From<&Settings> for ExtractorKey {
    fn from(settings: &Settings) -> Self {
        Self {
            mode: settings.mode,
            start_marker: settings.start_marker.clone(),
            end_marker: settings.end_marker.clone(),
            pattern: settings.pattern.clone(),
            case_sensitive: settings.case_sensitive,
        }
    }
}

/// A compiled extraction strategy
#[derive(Debug, Clone)]
pub enum Extractor {
    /// Literal markers; `end == None` means "to the end of the block"
    Between { start: Regex, end: Option<Regex> },
    /// Capture group 1 of the configured pattern
    Capture(Regex),
    /// Nothing can match (empty start marker or invalid pattern)
    Disabled,
}

impl Extractor {
    /// Compile the active strategy for `settings`
    ///
    /// Configuration problems never fail here; they disable extraction until
    /// the settings change.
    pub fn compile(settings: &Settings) -> Self {
        match settings.mode {
            ExtractionMode::Between => Self::compile_between(
                &settings.start_marker,
                &settings.end_marker,
                settings.case_sensitive,
            ),
            ExtractionMode::Regex => {
                Self::compile_capture(&settings.pattern, settings.case_sensitive)
            }
        }
    }

    fn compile_between(start: &str, end: &str, case_sensitive: bool) -> Self {
        if start.is_empty() {
            tracing::debug!("empty start marker, extraction disabled");
            return Extractor::Disabled;
        }

        let literal = |text: &str| {
            RegexBuilder::new(&regex::escape(text))
                .case_insensitive(!case_sensitive)
                .build()
        };

        let start = match literal(start) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!("cannot compile start marker: {}", e);
                return Extractor::Disabled;
            }
        };
        let end = if end.is_empty() {
            None
        } else {
            match literal(end) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("cannot compile end marker: {}", e);
                    return Extractor::Disabled;
                }
            }
        };

        Extractor::Between { start, end }
    }

    fn compile_capture(pattern: &str, case_sensitive: bool) -> Self {
        match RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(re) => Extractor::Capture(re),
            Err(e) => {
                tracing::warn!("invalid extraction pattern, extraction disabled: {}", e);
                Extractor::Disabled
            }
        }
    }

    /// First candidate in the haystack, or `None`
    ///
    /// An empty candidate counts as no match.
    pub fn extract<'h>(&self, haystack: &'h Haystack) -> Option<&'h str> {
        let found = haystack.blocks().find_map(|block| self.extract_block(block));
        found.filter(|candidate| !candidate.is_empty())
    }

    fn extract_block<'h>(&self, block: &'h str) -> Option<&'h str> {
        match self {
            Extractor::Between { start, end } => {
                let from = start.find(block)?.end();
                let rest = &block[from..];
                match end {
                    Some(end) => end.find(rest).map(|m| &rest[..m.start()]),
                    None => Some(rest),
                }
            }
            Extractor::Capture(re) => {
                if re.captures_len() < 2 {
                    return None;
                }
                // a match stops the search even if group 1 did not participate
                re.captures(block)
                    .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
            }
            Extractor::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIE: &str = "Set-Cookie: cognito-fl=\"eyJhIjoxfQ==\";";

    fn haystack(blocks: &[&str]) -> Haystack {
        let mut h = Haystack::new();
        for b in blocks {
            h.push(*b);
        }
        h
    }

    fn between(start: &str, end: &str) -> Settings {
        Settings {
            start_marker: start.to_string(),
            end_marker: end.to_string(),
            ..Settings::default()
        }
    }

    fn regex(pattern: &str) -> Settings {
        Settings {
            mode: ExtractionMode::Regex,
            pattern: pattern.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_between_default_markers() {
        let ex = Extractor::compile(&Settings::default());
        assert_eq!(ex.extract(&haystack(&[COOKIE])), Some("eyJhIjoxfQ=="));
    }

    #[test]
    fn test_regex_default_pattern() {
        let ex = Extractor::compile(&regex(r#"Set-Cookie:\s*cognito-fl="([^"]+)""#));
        assert_eq!(ex.extract(&haystack(&[COOKIE])), Some("eyJhIjoxfQ=="));
    }

    #[test]
    fn test_between_markers_are_literal() {
        let ex = Extractor::compile(&between("a.*(", ")"));
        assert_eq!(ex.extract(&haystack(&["xx a.*(inner) yy"])), Some("inner"));
        assert_eq!(ex.extract(&haystack(&["xx abc(inner) yy"])), None);
    }

    #[test]
    fn test_between_empty_end_runs_to_block_end() {
        let ex = Extractor::compile(&between("token=", ""));
        assert_eq!(
            ex.extract(&haystack(&["a\r\ntoken=abc\r\nb", "token=zzz"])),
            Some("abc\r\nb")
        );
    }

    #[test]
    fn test_between_missing_end_tries_next_block() {
        let ex = Extractor::compile(&between("id=", ";"));
        assert_eq!(
            ex.extract(&haystack(&["id=unterminated", "id=second;"])),
            Some("second")
        );
    }

    #[test]
    fn test_between_case_sensitivity() {
        let mut settings = between("TOKEN=", ";");
        assert_eq!(
            Extractor::compile(&settings).extract(&haystack(&["token=abc;"])),
            Some("abc")
        );
        settings.case_sensitive = true;
        assert_eq!(
            Extractor::compile(&settings).extract(&haystack(&["token=abc;"])),
            None
        );
    }

    #[test]
    fn test_empty_start_marker_disables() {
        let ex = Extractor::compile(&between("", ";"));
        assert!(matches!(ex, Extractor::Disabled));
        assert_eq!(ex.extract(&haystack(&["anything;"])), None);
    }

    #[test]
    fn test_headers_block_wins_over_body() {
        let ex = Extractor::compile(&between("v=", ";"));
        assert_eq!(
            ex.extract(&haystack(&["v=header;", "v=body;"])),
            Some("header")
        );
    }

    #[test]
    fn test_regex_without_group_is_no_match() {
        let ex = Extractor::compile(&regex("token=[a-z]+"));
        assert_eq!(ex.extract(&haystack(&["token=abc"])), None);
    }

    #[test]
    fn test_invalid_regex_disables() {
        let ex = Extractor::compile(&regex("([a-z"));
        assert!(matches!(ex, Extractor::Disabled));
    }

    #[test]
    fn test_regex_dot_matches_newline() {
        let ex = Extractor::compile(&regex("<b>(.*?)</b>"));
        assert_eq!(ex.extract(&haystack(&["<b>one\ntwo</b>"])), Some("one\ntwo"));
    }

    #[test]
    fn test_regex_case_insensitive_by_default() {
        let ex = Extractor::compile(&regex("TOKEN=([a-z]+)"));
        assert_eq!(ex.extract(&haystack(&["token=abc"])), Some("abc"));
    }

    #[test]
    fn test_adjacent_markers_are_no_match() {
        let ex = Extractor::compile(&between("v=", ";"));
        assert_eq!(ex.extract(&haystack(&["v=;", "v=later;"])), None);
    }

    #[test]
    fn test_empty_haystack() {
        let ex = Extractor::compile(&Settings::default());
        assert_eq!(ex.extract(&Haystack::new()), None);
    }

    #[test]
    fn test_haystack_from_response_scope() {
        let headers = ["HTTP/1.1 200 OK", "Set-Cookie: a=1"];
        let mut settings = Settings::default();
        let h = Haystack::from_response(&headers, "body", &settings);
        assert_eq!(h.blocks().collect::<Vec<_>>(), vec!["HTTP/1.1 200 OK\r\nSet-Cookie: a=1"]);

        settings.search_body = true;
        let h = Haystack::from_response(&headers, "body", &settings);
        assert_eq!(h.blocks().count(), 2);

        settings.search_headers = false;
        settings.search_body = false;
        assert!(Haystack::from_response(&headers, "body", &settings).is_empty());
    }
}
