//! Zoom OAuth provider implementation.
//!
//! Zoom authenticates the client with HTTP Basic on its token and revocation endpoints and
//! grants the scopes configured on the app, so no scopes are requested by default.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::http::HttpFetch;
use crate::oauth::token::{CodeExchangeRequest, TokenSet};
use crate::oauth::{
    de, full_name, non_empty, AuthorizationRequest, CanonicalIdentity, Client,
    ClientAuthentication, ClientSettings, Endpoints, ProviderKind, ProviderOptions, UserInfo,
};

pub const ID: &str = "zoom";
pub const NAME: &str = "Zoom";

pub const AUTHORIZATION_URL: &str = "https://zoom.us/oauth/authorize";
pub const TOKEN_URL: &str = "https://zoom.us/oauth/token";
pub const USER_INFO_URL: &str = "https://api.zoom.us/v2/users/me";
pub const REVOCATION_URL: &str = "https://zoom.us/oauth/revoke";

pub fn default_endpoints() -> Result<Endpoints, Error> {
    Endpoints::parse(AUTHORIZATION_URL, TOKEN_URL, USER_INFO_URL)?.with_revocation(REVOCATION_URL)
}

/// `GET /v2/users/me` response.
#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub email: Option<String>,
    /// `1` once the email address is verified.
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub verified: Option<bool>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub pic_url: Option<String>,
}

impl From<Profile> for CanonicalIdentity {
    fn from(profile: Profile) -> Self {
        let name = non_empty(profile.display_name).or_else(|| {
            full_name(profile.first_name.as_deref(), profile.last_name.as_deref())
        });

        CanonicalIdentity {
            id: profile.id,
            email: profile.email,
            email_verified: profile.verified.unwrap_or(false),
            name,
            image: profile.pic_url,
        }
    }
}

/// Zoom OAuth provider.
#[derive(Debug)]
pub struct Provider {
    client: Client,
}

impl Provider {
    pub fn new(options: ProviderOptions, fetch: Arc<dyn HttpFetch>) -> Result<Self, Error> {
        Self::with_endpoints(default_endpoints()?, options, fetch)
    }

    pub fn with_endpoints(
        endpoints: Endpoints,
        options: ProviderOptions,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let settings =
            ClientSettings::default().with_authentication(ClientAuthentication::BasicAuth);

        Ok(Self {
            client: Client::new(ID, options, endpoints, settings, fetch)?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Zoom
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

    async fn revoke_token(&self, token: &str) -> Result<(), Error> {
        self.client.revoke_token(token).await
    }
}
