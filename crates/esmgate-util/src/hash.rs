/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Compute the BLAKE3 hash of a string key, truncated to `len` hex characters.
///
/// Used to turn arbitrary keys (which may contain `/` or `@`) into flat file names.
#[must_use]
pub fn blake3_key(key: &str, len: usize) -> String {
    let mut hex = blake3_bytes(key.as_bytes());
    hex.truncate(len);
    hex
}
