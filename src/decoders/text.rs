use super::{b64, bytes_to_text, pad_base64, DecodeError};

pub(super) fn decode_hex(input: &str) -> Result<Vec<u8>, DecodeError> {
    let digits: String = input.chars().filter(char::is_ascii_hexdigit).collect();
    Ok(hex::decode(digits)?)
}

/// Form-style percent decoding, repeated until stable or `max_passes` is reached
pub(super) fn url_decode_multipass(input: &str, max_passes: usize) -> String {
    let mut current = input.to_string();
    for _ in 0..max_passes {
        let plus_as_space = current.replace('+', " ");
        let decoded = urlencoding::decode_binary(plus_as_space.as_bytes());
        let next = bytes_to_text(decoded.into_owned());
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Render the header and payload segments of a JWT
pub(super) fn decode_jwt(input: &str) -> Result<String, DecodeError> {
    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() < 2 {
        return Err(DecodeError::NotJwt);
    }

    let header = bytes_to_text(b64::decode_url_safe(&pad_base64(parts[0]))?);
    let payload = bytes_to_text(b64::decode_url_safe(&pad_base64(parts[1]))?);

    Ok(format!(
        "[JWT header]\n{}\n\n[JWT payload]\n{}",
        json_pretty(&header).unwrap_or(header),
        json_pretty(&payload).unwrap_or(payload)
    ))
}

/// Re-serialize JSON with two-space indentation, keeping key order and non-ASCII text
pub(super) fn json_pretty(input: &str) -> Result<String, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
