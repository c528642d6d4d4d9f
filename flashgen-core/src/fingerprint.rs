//! Content fingerprint of a source text, stored with every generation and
//! error log entry.

use sha2::{Digest, Sha256};

pub fn sha256_hex(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    format!("{hash:x}")
}

/// Stable 64-bit seed derived from the text digest.
pub fn seed(text: &str) -> u64 {
    let hash = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn seed_is_stable() {
        assert_eq!(seed("hello world"), seed("hello world"));
        assert_ne!(seed("hello world"), seed("hello world!"));
    }
}
