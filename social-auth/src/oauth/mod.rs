//! OAuth 2.0 social sign-in infrastructure.
//!
//! Authorization code flow with PKCE (S256) against identity providers, the token endpoint
//! engine, and user info normalization into a provider-agnostic identity.

mod authorization;
mod client;
mod options;
mod pkce;
mod provider;
mod state;
mod user_info;

pub mod providers;
pub mod token;

pub use authorization::{
    create_authorization_url, resolve_scopes, AuthorizationRequest, AuthorizationUrlParams,
};
pub use client::{Client, ClientSettings};
pub use options::{
    BoxFuture, ClientAuthentication, GetUserInfoFn, ProviderOptions, RefreshAccessTokenFn,
    RefreshStrategy, UserInfoStrategy,
};
pub use pkce::{PkceChallenge, PkceVerifier};
pub use provider::{Endpoints, Provider, ProviderKind, ProviderKindParseError};
pub use state::generate_state;
pub use token::{CodeExchangeRequest, TokenSet};
pub use user_info::{
    de, decode_profile, full_name, non_empty, normalize, CanonicalIdentity, UserInfo,
};
