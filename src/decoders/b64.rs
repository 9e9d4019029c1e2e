use super::DecodeError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

// Lenient about trailing bits and padding; the sanitizer already pads to a multiple of four.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

pub(super) fn decode_standard(input: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(input)?)
}

pub(super) fn decode_url_safe(input: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(URL_SAFE.decode(input)?)
}

/// Standard alphabet first, URL-safe when that fails
pub(super) fn decode_auto(input: &str) -> Result<Vec<u8>, DecodeError> {
    decode_standard(input).or_else(|e| {
        tracing::debug!("standard base64 failed ({}), trying URL-safe", e);
        decode_url_safe(input)
    })
}
