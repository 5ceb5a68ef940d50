//! Google OAuth provider implementation.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::oidc::Claims;
use crate::error::Error;
use crate::http::HttpFetch;
use crate::oauth::token::{CodeExchangeRequest, TokenSet};
use crate::oauth::{
    AuthorizationRequest, Client, ClientSettings, Endpoints, ProviderKind, ProviderOptions,
    UserInfo,
};

pub const ID: &str = "google";
pub const NAME: &str = "Google";
pub const DEFAULT_SCOPES: &[&str] = &["email", "profile", "openid"];

pub const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const USER_INFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const REVOCATION_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Google's public endpoints.
pub fn default_endpoints() -> Result<Endpoints, Error> {
    Endpoints::parse(AUTHORIZATION_URL, TOKEN_URL, USER_INFO_URL)?.with_revocation(REVOCATION_URL)
}

/// Google OAuth provider.
///
/// Handles OAuth 2.0 flows for Google accounts, including:
/// - Authorization URL generation with PKCE and offline access
/// - Authorization code exchange
/// - Token refresh and revocation
/// - User info retrieval from the OpenID Connect user info endpoint
#[derive(Debug)]
pub struct Provider {
    client: Client,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `options` - Client credentials, scopes and overrides
    /// * `hosted_domain` - Restrict the account chooser to one Workspace domain (`hd`)
    /// * `fetch` - Transport used for token and user info requests
    pub fn new(
        options: ProviderOptions,
        hosted_domain: Option<String>,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        Self::with_endpoints(default_endpoints()?, options, hosted_domain, fetch)
    }

    /// Create a provider bound to explicit endpoints, e.g. a local emulator.
    pub fn with_endpoints(
        endpoints: Endpoints,
        options: ProviderOptions,
        hosted_domain: Option<String>,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let mut settings = ClientSettings::default()
            .with_default_scopes(DEFAULT_SCOPES)
            .with_authorization_param("access_type", "offline")
            .with_authorization_param("include_granted_scopes", "true");
        if let Some(hd) = hosted_domain {
            settings = settings.with_authorization_param("hd", hd);
        }

        Ok(Self {
            client: Client::new(ID, options, endpoints, settings, fetch)?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
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
        self.client.user_info::<Claims>(tokens).await
    }

    async fn revoke_token(&self, token: &str) -> Result<(), Error> {
        self.client.revoke_token(token).await
    }
}
