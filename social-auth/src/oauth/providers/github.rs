//! GitHub OAuth app provider implementation.
//!
//! GitHub is plain OAuth 2.0 (no OIDC): the profile comes from the REST API and the email
//! address, when private, from `/user/emails`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{configuration_error, ConfigurationErrorKind, Error};
use crate::http::HttpFetch;
use crate::oauth::token::{CodeExchangeRequest, TokenSet};
use crate::oauth::{
    de, decode_profile, non_empty, AuthorizationRequest, CanonicalIdentity, Client,
    ClientSettings, Endpoints, ProviderKind, ProviderOptions, UserInfo,
};

pub const ID: &str = "github";
pub const NAME: &str = "GitHub";
pub const DEFAULT_SCOPES: &[&str] = &["read:user", "user:email"];

pub const AUTHORIZATION_URL: &str = "https://github.com/login/oauth/authorize";
pub const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const USER_INFO_URL: &str = "https://api.github.com/user";

/// GitHub's public endpoints. GitHub has no RFC 7009 revocation endpoint.
pub fn default_endpoints() -> Result<Endpoints, Error> {
    Endpoints::parse(AUTHORIZATION_URL, TOKEN_URL, USER_INFO_URL)
}

/// `GET /user` response.
#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// One entry of `GET /user/emails`.
#[derive(Debug, Clone, Deserialize)]
pub struct Email {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

impl Profile {
    /// Map to the canonical identity, resolving the email against the account's address list.
    ///
    /// A profile without a public email takes the primary address (or the first one listed).
    /// The verification flag always comes from the address list.
    fn into_identity(self, emails: &[Email]) -> CanonicalIdentity {
        let email = non_empty(self.email).or_else(|| {
            emails
                .iter()
                .find(|entry| entry.primary)
                .or_else(|| emails.first())
                .map(|entry| entry.email.clone())
        });
        let email_verified = email
            .as_deref()
            .and_then(|address| emails.iter().find(|entry| entry.email == address))
            .is_some_and(|entry| entry.verified);

        CanonicalIdentity {
            id: self.id,
            email,
            email_verified,
            name: non_empty(self.name).or_else(|| non_empty(self.login)),
            image: self.avatar_url,
        }
    }
}

/// `{user_info}/emails`, tolerating a trailing slash on the user info endpoint.
fn emails_url(user_info: &Url) -> Result<Url, Error> {
    let mut url = user_info.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| {
            configuration_error(
                ConfigurationErrorKind::InvalidEndpoint,
                "user info endpoint cannot be a base URL",
            )
        })?
        .pop_if_empty()
        .push("emails");
    Ok(url)
}

/// GitHub OAuth provider.
#[derive(Debug)]
pub struct Provider {
    client: Client,
    emails_url: Url,
}

impl Provider {
    pub fn new(options: ProviderOptions, fetch: Arc<dyn HttpFetch>) -> Result<Self, Error> {
        Self::with_endpoints(default_endpoints()?, options, fetch)
    }

    /// Create a provider bound to explicit endpoints, e.g. GitHub Enterprise Server.
    ///
    /// The email list is read from `user/emails` next to the user info endpoint.
    pub fn with_endpoints(
        endpoints: Endpoints,
        options: ProviderOptions,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let emails_url = emails_url(&endpoints.user_info)?;
        let settings = ClientSettings::default().with_default_scopes(DEFAULT_SCOPES);

        Ok(Self {
            client: Client::new(ID, options, endpoints, settings, fetch)?,
            emails_url,
        })
    }

    async fn emails(&self, tokens: &TokenSet) -> Vec<Email> {
        let Some(data) = self.client.fetch_json(&self.emails_url, tokens).await else {
            return Vec::new();
        };
        decode_profile::<Vec<Email>>(ID, &data).unwrap_or_default()
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
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
        if let Some(get_user_info) = self.client.custom_user_info() {
            return get_user_info(tokens.clone()).await;
        }

        let data = self
            .client
            .fetch_json(&self.client.endpoints().user_info, tokens)
            .await?;
        let profile: Profile = decode_profile(ID, &data)?;

        let emails = self.emails(tokens).await;
        debug!(provider = ID, addresses = emails.len(), "Resolved account email addresses");

        Some(UserInfo {
            user: profile.into_identity(&emails),
            data,
        })
    }
}
