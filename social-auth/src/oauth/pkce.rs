//! PKCE (Proof Key for Code Exchange) support for OAuth 2.0.
//!
//! Implements the S256 method of RFC 7636. The engine only derives challenges from verifiers
//! handed to it; generating and persisting the verifier is the caller's job.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

/// PKCE code verifier (random string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generate a new random PKCE verifier.
    ///
    /// 32 random bytes, base64url encoded: 43 characters from the unreserved set.
    pub fn generate() -> Self {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        Self(URL_SAFE_NO_PAD.encode(random_bytes))
    }

    /// Create a PKCE verifier from an existing string.
    pub fn from_string(verifier: String) -> Self {
        Self(verifier)
    }

    /// Get the verifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate the corresponding code challenge.
    pub fn challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self.as_str())
    }
}

/// PKCE code challenge (SHA256 hash of verifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// The only challenge method the engine emits.
    pub const METHOD: &'static str = "S256";

    /// Create a code challenge from a verifier: `BASE64URL(SHA256(verifier))`, unpadded.
    pub fn from_verifier(verifier: &str) -> Self {
        let hash = Sha256::digest(verifier.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Get the challenge string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
