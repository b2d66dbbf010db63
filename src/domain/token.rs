//! Session token value object.
//!
//! Tokens are 256 bits from the operating system CSPRNG, hex encoded.
//! Only their SHA-256 digest is ever persisted.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::config::SESSION_TOKEN_BYTES;

/// Opaque secret bound to a session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

impl SessionToken {
    /// Draw a fresh token. Nothing about the user or the clock goes into it.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a token presented by a client.
    pub fn from_presented(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this token.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_is_256_bit_hex() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), SESSION_TOKEN_BYTES * 2);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| SessionToken::generate().as_str().to_string())
            .collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_digest_is_stable_and_differs_from_token() {
        let token = SessionToken::from_presented("abc");
        assert_eq!(
            token.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(token.digest(), token.as_str());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = SessionToken::generate();
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
