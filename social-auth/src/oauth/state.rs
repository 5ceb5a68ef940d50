//! CSRF state tokens for OAuth flows.
//!
//! Providers never generate or remember state. Orchestrators call [`generate_state`] when a
//! login attempt starts, persist the value alongside the PKCE verifier, and compare it against
//! the `state` returned on the redirect before exchanging the code.

use rand::Rng;

/// Generate a cryptographically random state token (32 bytes, hex encoded).
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}
