//! Opaque session token generation and hashing

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "mams_";
const TOKEN_RANDOM_LEN: usize = 48;

/// Session token generator
pub struct SessionToken;

impl SessionToken {
    /// Generate a new bearer token
    /// Format: mams_<48-char-random>
    pub fn generate() -> String {
        let random: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_RANDOM_LEN)
            .map(char::from)
            .collect();

        format!("{}{}", TOKEN_PREFIX, random)
    }

    /// SHA-256 hex digest; the only form of a token that is persisted
    pub fn hash(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let token = SessionToken::generate();
        assert!(token.starts_with("mams_"));
        assert_eq!(token.len(), TOKEN_PREFIX.len() + TOKEN_RANDOM_LEN);
        assert_ne!(token, SessionToken::generate());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let token = "mams_abcdefghijklmnopqrstuvwxyz";
        assert_eq!(SessionToken::hash(token), SessionToken::hash(token));
        assert_ne!(SessionToken::hash(token), SessionToken::hash("mams_other"));
    }

    #[test]
    fn test_hash_length() {
        // SHA-256 produces 64 hex characters
        let hash = SessionToken::hash("token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
