use super::DecodeError;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate gzip, zlib-wrapped deflate or raw deflate
///
/// The candidate is text, so each char is mapped back to the byte it was read
/// from (Latin-1). Gzip is chosen by magic bytes; otherwise zlib then raw
/// deflate are tried in turn.
pub(super) fn inflate(input: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = latin1_bytes(input).ok_or(DecodeError::NotCompressed)?;

    if bytes.starts_with(&GZIP_MAGIC) {
        return read_all(GzDecoder::new(bytes.as_slice())).ok_or(DecodeError::NotCompressed);
    }

    read_all(ZlibDecoder::new(bytes.as_slice()))
        .or_else(|| read_all(DeflateDecoder::new(bytes.as_slice())))
        .ok_or(DecodeError::NotCompressed)
}

fn read_all(mut reader: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    match reader.read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(e) => {
            tracing::debug!("inflate attempt failed: {}", e);
            None
        }
    }
}

fn latin1_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
