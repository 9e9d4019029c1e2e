use super::DecoderKind;

/// Clean a raw candidate before handing it to `kind`'s decoder
///
/// Every decoder gets surrounding whitespace and one layer of matching quotes
/// removed. Base64 flavours keep only the longest run of their alphabet and
/// are padded to a multiple of four; hex keeps only hex digits.
pub fn sanitize(candidate: &str, kind: DecoderKind) -> String {
    let trimmed = strip_quotes(candidate.trim());

    match kind {
        // Auto accepts both alphabets so the URL-safe fallback can actually see '-' and '_'
        DecoderKind::AutoBase64 => pad_base64(longest_run(trimmed, |c| {
            is_standard_b64(c) || c == '-' || c == '_'
        })),
        DecoderKind::Base64 => pad_base64(longest_run(trimmed, is_standard_b64)),
        DecoderKind::Base64Url => pad_base64(longest_run(trimmed, is_url_safe_b64)),
        DecoderKind::Hex => trimmed.chars().filter(char::is_ascii_hexdigit).collect(),
        _ => trimmed.to_string(),
    }
}

/// Pad a base64 string with '=' up to a multiple of four
pub fn pad_base64(s: &str) -> String {
    let mut padded = s.to_string();
    let rem = padded.len() % 4;
    if rem != 0 {
        padded.extend(std::iter::repeat('=').take(4 - rem));
    }
    padded
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn is_standard_b64(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

fn is_url_safe_b64(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='
}

/// First longest run of characters accepted by `allowed`, or the input when there is none
fn longest_run(s: &str, allowed: impl Fn(char) -> bool) -> &str {
    let mut best: Option<&str> = None;
    for run in s.split(|c: char| !allowed(c)).filter(|r| !r.is_empty()) {
        if best.map_or(true, |b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best.unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace_and_one_quote_layer() {
        assert_eq!(sanitize("  \"abc\"  ", DecoderKind::JsonPretty), "abc");
        assert_eq!(sanitize("'\"abc\"'", DecoderKind::JsonPretty), "\"abc\"");
        assert_eq!(sanitize("\"abc'", DecoderKind::JsonPretty), "\"abc'");
    }

    #[test]
    fn test_base64_keeps_longest_run_and_pads() {
        assert_eq!(sanitize("x; SGVsbG8; y", DecoderKind::Base64), "SGVsbG8=");
        assert_eq!(sanitize("ab-cdef", DecoderKind::Base64), "cdef");
    }

    #[test]
    fn test_url_safe_alphabet() {
        assert_eq!(sanitize("ab-c_d+ef", DecoderKind::Base64Url), "ab-c_d==");
    }

    #[test]
    fn test_auto_accepts_both_alphabets() {
        assert_eq!(
            sanitize("SGVsbG8tV29ybGQ_", DecoderKind::AutoBase64),
            "SGVsbG8tV29ybGQ_"
        );
    }

    #[test]
    fn test_hex_strips_non_hex() {
        assert_eq!(sanitize("de:ad:be:ef", DecoderKind::Hex), "deadbeef");
        assert_eq!(sanitize("0x41zz", DecoderKind::Hex), "041");
    }

    #[test]
    fn test_no_run_leaves_input() {
        assert_eq!(sanitize("!!", DecoderKind::Base64), "!!==");
    }

    #[test]
    fn test_pad_base64() {
        assert_eq!(pad_base64("abcd"), "abcd");
        assert_eq!(pad_base64("abc"), "abc=");
        assert_eq!(pad_base64("ab"), "ab==");
        assert_eq!(pad_base64(""), "");
    }
}
