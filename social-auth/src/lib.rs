//! # social-auth
//!
//! Provider-agnostic OAuth 2.0 / OpenID Connect sign-in engine:
//! - Authorization URL construction with PKCE (S256)
//! - Authorization code exchange, token refresh and revocation
//! - User info retrieval normalized into a canonical identity
//! - Adapters for Asgardeo, generic OIDC, Google, GitHub and Zoom
//!
//! ## Architecture
//!
//! Every adapter is a thin binding of the shared [`oauth::Client`] engine to one provider's
//! endpoints and profile format. Adapters hold no per-login state: the caller generates and
//! remembers `state` and the PKCE verifier across the redirect, and persists the returned
//! tokens. HTTP goes through the [`http::HttpFetch`] trait so transports can be swapped.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use social_auth::{
//!     http::HttpClientBuilder,
//!     oauth::{generate_state, AuthorizationRequest, PkceVerifier, ProviderKind, ProviderOptions},
//!     providers::{build_provider, ProviderConfig},
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;
pub mod providers;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
