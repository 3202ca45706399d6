use sha2::{Digest, Sha256};

/// Calculates the SHA256 hash of the given content as a lowercase hex string.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for chunk in content.chunks(8192) {
        hasher.update(chunk);
    }
    let digest = hasher.finalize();
    format!("{digest:x}")
}

/// Whether `value` has the shape of a digest produced by [`content_hash`].
pub fn is_content_hash(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
