use crate::config::{keys, ExtractionMode, Settings, MAX_OUTPUT_LENGTH, MIN_OUTPUT_LENGTH};
use crate::error::{GrepxError, Result, ValidationError};
use regex::RegexBuilder;

/// Settings validator
///
/// Loading never fails; this reports the settings that will make extraction
/// silently find nothing, so the CLI can point them out.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the settings
    pub fn validate(settings: &Settings) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_extraction(settings, &mut errors);
        Self::validate_scope(settings, &mut errors);
        Self::validate_output(settings, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GrepxError::ConfigValidation { errors })
        }
    }

    fn validate_extraction(settings: &Settings, errors: &mut Vec<ValidationError>) {
        match settings.mode {
            ExtractionMode::Between => {
                if settings.start_marker.is_empty() {
                    errors.push(ValidationError::new(
                        keys::START_AFTER,
                        "Start marker cannot be empty",
                    ));
                }
            }
            ExtractionMode::Regex => {
                match RegexBuilder::new(&settings.pattern)
                    .case_insensitive(!settings.case_sensitive)
                    .dot_matches_new_line(true)
                    .build()
                {
                    Ok(re) if re.captures_len() < 2 => errors.push(ValidationError::new(
                        keys::REGEX,
                        "Pattern has no capture group; group 1 is what gets decoded",
                    )),
                    Ok(_) => {}
                    Err(e) => errors.push(ValidationError::new(
                        keys::REGEX,
                        format!("Invalid pattern: {}", e),
                    )),
                }
            }
        }
    }

    fn validate_scope(settings: &Settings, errors: &mut Vec<ValidationError>) {
        if !settings.search_headers && !settings.search_body {
            errors.push(ValidationError::new(
                keys::IN_HEADERS,
                "Neither headers nor body is searched",
            ));
        }
    }

    fn validate_output(settings: &Settings, errors: &mut Vec<ValidationError>) {
        let len = settings.max_output_length;
        if !(MIN_OUTPUT_LENGTH..=MAX_OUTPUT_LENGTH).contains(&len) {
            errors.push(ValidationError::new(
                keys::MAX_OUT,
                format!(
                    "Max length must be between {} and {}, got {}",
                    MIN_OUTPUT_LENGTH, MAX_OUTPUT_LENGTH, len
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_defaults() {
        assert!(ConfigValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_default_regex_is_valid() {
        let settings = Settings {
            mode: ExtractionMode::Regex,
            ..Settings::default()
        };
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn test_empty_start_marker() {
        let settings = Settings {
            start_marker: String::new(),
            ..Settings::default()
        };
        assert!(ConfigValidator::validate(&settings).is_err());
    }

    #[test]
    fn test_bad_pattern_and_no_group() {
        let mut settings = Settings {
            mode: ExtractionMode::Regex,
            pattern: "([a-z".to_string(),
            ..Settings::default()
        };
        assert!(ConfigValidator::validate(&settings).is_err());

        settings.pattern = "token=[a-z]+".to_string();
        match ConfigValidator::validate(&settings) {
            Err(GrepxError::ConfigValidation { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, keys::REGEX);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_collects_every_problem() {
        let settings = Settings {
            start_marker: String::new(),
            search_headers: false,
            search_body: false,
            max_output_length: 0,
            ..Settings::default()
        };
        match ConfigValidator::validate(&settings) {
            Err(GrepxError::ConfigValidation { errors }) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
