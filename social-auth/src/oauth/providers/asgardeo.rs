//! Asgardeo OAuth provider implementation.
//!
//! Endpoints are derived from the tenant issuer URL, e.g. `https://api.asgardeo.io/t/acme`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::http::HttpFetch;
use crate::oauth::token::{CodeExchangeRequest, TokenSet};
use crate::oauth::{
    de, full_name, AuthorizationRequest, CanonicalIdentity, Client, ClientSettings, Endpoints,
    ProviderKind, ProviderOptions, UserInfo,
};

pub const ID: &str = "asgardeo";
pub const NAME: &str = "Asgardeo";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Derive the authorization, token and user info endpoints from an issuer URL.
pub fn issuer_endpoints(issuer: &str) -> Result<Endpoints, Error> {
    let issuer = issuer.trim().trim_end_matches('/');
    Endpoints::parse(
        &format!("{}/oauth2/authorize", issuer),
        &format!("{}/oauth2/token", issuer),
        &format!("{}/oauth2/userinfo", issuer),
    )
}

/// Claims returned by the Asgardeo user info endpoint.
#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "de::string_or_number")]
    pub sub: String,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub email_verified: Option<bool>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

impl From<Profile> for CanonicalIdentity {
    fn from(profile: Profile) -> Self {
        CanonicalIdentity {
            name: full_name(profile.given_name.as_deref(), profile.family_name.as_deref()),
            id: profile.sub,
            email: profile.email,
            email_verified: profile.email_verified.unwrap_or(false),
            image: profile.picture,
        }
    }
}

/// Asgardeo OAuth provider.
///
/// Public clients are allowed: without a client secret the flow relies on PKCE alone.
#[derive(Debug)]
pub struct Provider {
    client: Client,
}

impl Provider {
    /// Create a provider for the tenant at `issuer`.
    ///
    /// # Arguments
    ///
    /// * `issuer` - Tenant issuer URL, with or without a trailing slash
    /// * `options` - Client credentials, scopes and overrides
    /// * `fetch` - Transport used for token and user info requests
    pub fn new(
        issuer: &str,
        options: ProviderOptions,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        Self::with_endpoints(issuer_endpoints(issuer)?, options, fetch)
    }

    /// Create a provider bound to explicit endpoints.
    pub fn with_endpoints(
        endpoints: Endpoints,
        options: ProviderOptions,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let settings = ClientSettings::default()
            .with_default_scopes(DEFAULT_SCOPES)
            .public_client();

        Ok(Self {
            client: Client::new(ID, options, endpoints, settings, fetch)?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Asgardeo
    }

    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        NAME
    }

    fn options(&self) -> &ProviderOptions {
        self.client.options()
    }

    fn endpoints(&self) -> &Endpoints {
        self.client.endpoints()
    }

    fn create_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url, Error> {
        self.client.create_authorization_url(request)
    }

    async fn validate_authorization_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<TokenSet, Error> {
        self.client.validate_authorization_code(request).await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, Error> {
        self.client.refresh_access_token(refresh_token).await
    }

    async fn get_user_info(&self, tokens: &TokenSet) -> Option<UserInfo> {
        self.client.user_info::<Profile>(tokens).await
    }
}
