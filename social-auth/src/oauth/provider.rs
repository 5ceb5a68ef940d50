//! OAuth provider trait and types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::token::{CodeExchangeRequest, TokenSet};
use super::{AuthorizationRequest, ProviderOptions, UserInfo};
use crate::error::{revocation_error, Error, RevocationErrorKind};

/// Known provider adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Asgardeo,
    GitHub,
    Google,
    Oidc,
    Zoom,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Asgardeo => "asgardeo",
            ProviderKind::GitHub => "github",
            ProviderKind::Google => "google",
            ProviderKind::Oidc => "oidc",
            ProviderKind::Zoom => "zoom",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProviderKindParseError;

impl fmt::Display for ProviderKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown provider kind")
    }
}

impl std::error::Error for ProviderKindParseError {}

impl FromStr for ProviderKind {
    type Err = ProviderKindParseError;

    fn from_str(kind: &str) -> Result<ProviderKind, Self::Err> {
        match kind.to_lowercase().as_str() {
            "asgardeo" => Ok(ProviderKind::Asgardeo),
            "github" => Ok(ProviderKind::GitHub),
            "google" => Ok(ProviderKind::Google),
            "oidc" => Ok(ProviderKind::Oidc),
            "zoom" => Ok(ProviderKind::Zoom),
            _ => Err(ProviderKindParseError),
        }
    }
}

/// Endpoint URLs a provider instance is bound to. Parsed once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorization: Url,
    pub token: Url,
    pub user_info: Url,
    pub revocation: Option<Url>,
}

impl Endpoints {
    /// Parse the three mandatory endpoints. Malformed URLs are configuration errors.
    pub fn parse(authorization: &str, token: &str, user_info: &str) -> Result<Self, Error> {
        Ok(Self {
            authorization: Url::parse(authorization)?,
            token: Url::parse(token)?,
            user_info: Url::parse(user_info)?,
            revocation: None,
        })
    }

    /// Add an RFC 7009 revocation endpoint.
    pub fn with_revocation(mut self, revocation: &str) -> Result<Self, Error> {
        self.revocation = Some(Url::parse(revocation)?);
        Ok(self)
    }
}

/// Uniform contract every provider adapter satisfies.
///
/// Adapters are immutable after construction and hold no per-login data: `state`, PKCE
/// verifiers, codes and tokens all travel through arguments, so one instance can serve any
/// number of concurrent sign-ins.
#[async_trait]
pub trait Provider: fmt::Debug + Send + Sync {
    /// Get the provider kind.
    fn kind(&self) -> ProviderKind;

    /// Identifier of this provider instance (e.g. "asgardeo").
    fn id(&self) -> &str;

    /// Human readable provider name.
    fn name(&self) -> &str;

    /// Options this instance was configured with.
    fn options(&self) -> &ProviderOptions;

    /// Endpoints this instance talks to.
    fn endpoints(&self) -> &Endpoints;

    /// Generate the authorization URL to redirect the user to.
    fn create_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url, Error>;

    /// Exchange an authorization code for tokens.
    ///
    /// The code verifier in `request` must be the verifier used to build the authorization
    /// URL; it is forwarded unmodified.
    async fn validate_authorization_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<TokenSet, Error>;

    /// Refresh an access token. Single attempt; retry policy belongs to the caller.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, Error>;

    /// Resolve the user's identity, or `None` when the profile cannot be obtained.
    async fn get_user_info(&self, tokens: &TokenSet) -> Option<UserInfo>;

    /// Revoke an access or refresh token.
    async fn revoke_token(&self, _token: &str) -> Result<(), Error> {
        Err(revocation_error(
            RevocationErrorKind::Unsupported,
            "provider has no revocation endpoint",
        ))
    }
}
