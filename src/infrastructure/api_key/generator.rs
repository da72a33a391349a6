//! API Key generation
//!
//! Generates random API keys and the hashes they are stored under.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of characters of the random part kept for display
const DISPLAY_CHARS: usize = 8;

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// The key prefix for identification
    pub prefix: String,
    /// The hashed key for storage
    pub hash: String,
}

/// Random bytes behind every generated key
const KEY_BYTES: usize = 32;

/// Issues `<prefix><base64url(32 random bytes)>` keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    prefix: String,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = [0u8; KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        self.describe(format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(random_bytes)))
    }

    /// Use a known secret as the full key
    ///
    /// Needed for bootstrap keys supplied through the environment and for tests.
    pub fn from_secret(&self, secret: &str) -> GeneratedApiKey {
        self.describe(secret.to_string())
    }

    fn describe(&self, key: String) -> GeneratedApiKey {
        let prefix = display_prefix(&key, self.prefix.len());
        let hash = hash_key(&key);

        GeneratedApiKey { key, prefix, hash }
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new("ek_")
    }
}

/// Storage form of a key: `sha256$<base64url digest>`
pub fn hash_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("sha256${}", URL_SAFE_NO_PAD.encode(digest))
}

/// Compare two hashes without an early exit on the first differing byte
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

fn display_prefix(key: &str, type_prefix_len: usize) -> String {
    key.chars().take(type_prefix_len + DISPLAY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key() {
        let generator = ApiKeyGenerator::default();
        let generated = generator.generate();

        assert!(generated.key.starts_with("ek_"));
        assert!(generated.prefix.starts_with("ek_"));
        assert_eq!(generated.prefix.len(), "ek_".len() + 8);
        assert!(generated.hash.starts_with("sha256$"));
    }

    #[test]
    fn test_generate_custom_prefix() {
        let generator = ApiKeyGenerator::new("custom_");
        let generated = generator.generate();

        assert!(generated.key.starts_with("custom_"));
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::default();
        let key1 = generator.generate();
        let key2 = generator.generate();

        assert_ne!(key1.key, key2.key);
        assert_ne!(key1.hash, key2.hash);
    }

    #[test]
    fn test_key_length() {
        let generated = ApiKeyGenerator::default().generate();

        // 32 bytes base64-encoded = 43 chars, plus prefix
        assert_eq!(generated.key.len(), "ek_".len() + 43);
    }

    #[test]
    fn test_from_secret_keeps_key_verbatim() {
        let generated = ApiKeyGenerator::default().from_secret("bootstrap-admin-key");

        assert_eq!(generated.key, "bootstrap-admin-key");
        assert_eq!(generated.prefix, "bootstrap-a");
        assert_eq!(generated.hash, hash_key("bootstrap-admin-key"));
    }

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_key("ek_test123"), hash_key("ek_test123"));
        assert_ne!(hash_key("ek_test123"), hash_key("ek_test124"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }
}
