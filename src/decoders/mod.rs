//! Decoder registry
//!
//! Maps each of the eight supported decoder names to a sanitizer and a pure
//! byte transformation. Decoders never touch the network or disk; a failure is
//! reported as a [`DecodeError`] whose text ends up in the annotation.

mod b64;
mod compression;
mod sanitize;
mod text;

use crate::error::GrepxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use sanitize::{pad_base64, sanitize};

/// Errors raised while decoding a sanitized candidate
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("not gzip/deflate data")]
    NotCompressed,

    #[error("not a JWT (expected at least two dot-separated segments)")]
    NotJwt,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The fixed set of decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DecoderKind {
    /// Standard base64 with URL-safe fallback
    #[default]
    #[serde(rename = "Auto (Base64)")]
    AutoBase64,
    #[serde(rename = "Base64")]
    Base64,
    #[serde(rename = "Base64 (URL-safe)")]
    Base64Url,
    #[serde(rename = "Hex -> Text")]
    Hex,
    #[serde(rename = "URL-decode")]
    UrlDecode,
    #[serde(rename = "Gzip/Deflate")]
    GzipDeflate,
    #[serde(rename = "JWT header+payload")]
    Jwt,
    #[serde(rename = "JSON pretty")]
    JsonPretty,
}

impl DecoderKind {
    /// All decoders, in the order they are offered to users
    pub const ALL: [DecoderKind; 8] = [
        DecoderKind::AutoBase64,
        DecoderKind::Base64,
        DecoderKind::Base64Url,
        DecoderKind::Hex,
        DecoderKind::UrlDecode,
        DecoderKind::GzipDeflate,
        DecoderKind::Jwt,
        DecoderKind::JsonPretty,
    ];

    /// Display name, also used as the persisted setting value
    pub fn name(self) -> &'static str {
        match self {
            DecoderKind::AutoBase64 => "Auto (Base64)",
            DecoderKind::Base64 => "Base64",
            DecoderKind::Base64Url => "Base64 (URL-safe)",
            DecoderKind::Hex => "Hex -> Text",
            DecoderKind::UrlDecode => "URL-decode",
            DecoderKind::GzipDeflate => "Gzip/Deflate",
            DecoderKind::Jwt => "JWT header+payload",
            DecoderKind::JsonPretty => "JSON pretty",
        }
    }

    /// Short alias accepted on the command line and in env overrides
    pub fn alias(self) -> &'static str {
        match self {
            DecoderKind::AutoBase64 => "auto",
            DecoderKind::Base64 => "base64",
            DecoderKind::Base64Url => "base64url",
            DecoderKind::Hex => "hex",
            DecoderKind::UrlDecode => "url",
            DecoderKind::GzipDeflate => "gzip",
            DecoderKind::Jwt => "jwt",
            DecoderKind::JsonPretty => "json",
        }
    }

    /// Apply this decoder's sanitizer to a raw candidate
    pub fn sanitize(self, candidate: &str) -> String {
        sanitize(candidate, self)
    }

    /// Decode an already sanitized value into raw bytes
    pub fn decode(self, input: &str) -> Result<Vec<u8>, DecodeError> {
        match self {
            DecoderKind::AutoBase64 => b64::decode_auto(input),
            DecoderKind::Base64 => b64::decode_standard(input),
            DecoderKind::Base64Url => b64::decode_url_safe(input),
            DecoderKind::Hex => text::decode_hex(input),
            DecoderKind::UrlDecode => Ok(text::url_decode_multipass(input, 3).into_bytes()),
            DecoderKind::GzipDeflate => compression::inflate(input),
            DecoderKind::Jwt => text::decode_jwt(input).map(String::into_bytes),
            DecoderKind::JsonPretty => text::json_pretty(input).map(String::into_bytes),
        }
    }

    /// Sanitize, decode and convert the result to text
    pub fn decode_to_text(self, candidate: &str) -> Result<String, DecodeError> {
        let cleaned = self.sanitize(candidate);
        self.decode(&cleaned).map(bytes_to_text)
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecoderKind {
    type Err = GrepxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DecoderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted || kind.alias().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GrepxError::UnknownDecoder(s.to_string()))
    }
}

/// Convert decoder output to text: UTF-8 when valid, Latin-1 otherwise
pub fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
