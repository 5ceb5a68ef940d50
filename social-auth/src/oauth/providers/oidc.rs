//! Generic OpenID Connect provider with explicitly configured endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::http::HttpFetch;
use crate::oauth::token::{CodeExchangeRequest, TokenSet};
use crate::oauth::{
    de, full_name, non_empty, AuthorizationRequest, CanonicalIdentity, Client, ClientSettings,
    Endpoints, ProviderKind, ProviderOptions, UserInfo,
};

pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Standard OIDC claims (OpenID Connect Core 1.0, section 5.1).
#[derive(Debug, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "de::string_or_number")]
    pub sub: String,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

impl From<Claims> for CanonicalIdentity {
    fn from(claims: Claims) -> Self {
        let name = non_empty(claims.name).or_else(|| {
            full_name(claims.given_name.as_deref(), claims.family_name.as_deref())
        });

        CanonicalIdentity {
            id: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.unwrap_or(false),
            name,
            image: claims.picture,
        }
    }
}

/// Generic OIDC provider.
///
/// The id and display name are configurable so several OIDC tenants can be registered side
/// by side.
#[derive(Debug)]
pub struct Provider {
    name: String,
    client: Client,
}

impl Provider {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoints: Endpoints,
        options: ProviderOptions,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let settings = ClientSettings::default()
            .with_default_scopes(DEFAULT_SCOPES)
            .public_client();

        Ok(Self {
            name: name.into(),
            client: Client::new(id, options, endpoints, settings, fetch)?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Oidc
    }

    fn id(&self) -> &str {
        self.client.id()
    }

    fn name(&self) -> &str {
        &self.name
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
        self.client.user_info::<Claims>(tokens).await
    }

    async fn revoke_token(&self, token: &str) -> Result<(), Error> {
        self.client.revoke_token(token).await
    }
}
