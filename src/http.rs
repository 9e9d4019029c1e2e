//! Minimal raw HTTP response splitting
//!
//! Only what the command line needs to build a haystack: header lines and the
//! body bytes after the first blank line.

use crate::decoders::bytes_to_text;

/// A response split into header lines and body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Status line followed by header lines, without line terminators
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Split at the first empty line (CRLF or bare LF)
    ///
    /// Without an empty line everything is treated as headers.
    pub fn parse(raw: &[u8]) -> Self {
        let (head, body) = match split_head(raw) {
            Some((head, body)) => (head, body.to_vec()),
            None => (raw, Vec::new()),
        };

        let headers = bytes_to_text(head.to_vec())
            .lines()
            .map(str::to_string)
            .collect();

        Self { headers, body }
    }

    /// Body as text, UTF-8 when valid and Latin-1 otherwise
    pub fn body_text(&self) -> String {
        bytes_to_text(self.body.clone())
    }
}

fn split_head(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let crlf = find(raw, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(raw, b"\n\n").map(|i| (i, 2));
    let (idx, sep_len) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&raw[..idx], &raw[idx + sep_len..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
