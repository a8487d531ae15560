//! SHA256 hashing and the two digest renderings shown to the user.

use alloc::string::String;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// A 32-byte SHA256 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Padded standard Base64 rendering (44 characters).
    pub fn to_base64(&self) -> String {
        B64.encode(self.0)
    }
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> Digest {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    Digest(result)
}

/// Both renderings of a text digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextHash {
    /// Base 16.
    pub hex: String,
    /// Base 64.
    pub base64: String,
}

/// Hash the UTF-8 bytes of `message` directly, without any structured encoding.
pub fn hash_text(message: &str) -> TextHash {
    let digest = sha256(message.as_bytes());
    TextHash {
        hex: digest.to_hex(),
        base64: digest.to_base64(),
    }
}

/// Base64 digest of `message` followed by the decimal `nonce`.
///
/// This is the candidate rendering the miner checks against the difficulty.
pub fn nonce_digest_base64(message: &str, nonce: u64) -> String {
    let input = alloc::format!("{}{}", message, nonce);
    sha256(input.as_bytes()).to_base64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_text_empty() {
        let hashed = hash_text("");
        assert_eq!(
            hashed.hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hashed.base64, "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn test_hash_text_hello() {
        let hashed = hash_text("hello");
        assert_eq!(
            hashed.hex,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(hashed.base64, "LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=");
    }

    #[test]
    fn test_hash_text_is_deterministic() {
        for msg in ["", "abc", "the quick brown fox", "ünïcödé ⛏️"] {
            assert_eq!(hash_text(msg), hash_text(msg));
        }
    }

    #[test]
    fn test_rendering_lengths() {
        let digest = sha256(b"abc");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.to_base64().len(), 44);
        assert!(digest.to_base64().ends_with('='));
        assert_eq!(digest.to_hex(), digest.to_hex().to_lowercase());
    }

    #[test]
    fn test_nonce_digest_large_nonce() {
        assert_eq!(
            nonce_digest_base64("x", u64::MAX),
            sha256(b"x18446744073709551615").to_base64()
        );
        assert_eq!(nonce_digest_base64("", 0), sha256(b"0").to_base64());
    }

    #[test]
    fn test_nonce_digest_matches_concatenation() {
        // "hello" + "21"
        assert_eq!(
            nonce_digest_base64("hello", 21),
            "0N5qP42kWAme989MH4jfBcjYZ43ThiX94eknE70WadI="
        );
        assert_eq!(nonce_digest_base64("hello", 21), sha256(b"hello21").to_base64());
    }
}
