//! Flow engine shared by every provider adapter.
//!
//! A `Client` binds one provider's endpoints, options and protocol quirks to the authorization
//! URL builder, the token endpoint engine and the user info normalizer. Adapters only add
//! their endpoint set, their settings and a profile mapping; all security-relevant protocol
//! handling happens here.

use std::fmt;
use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::authorization::{create_authorization_url, resolve_scopes, AuthorizationUrlParams};
use super::token::{self, CodeExchangeRequest, TokenEndpointRequest, TokenSet};
use super::user_info::{self, CanonicalIdentity, UserInfo};
use super::{
    AuthorizationRequest, ClientAuthentication, Endpoints, GetUserInfoFn, ProviderOptions,
    RefreshStrategy, UserInfoStrategy,
};
use crate::error::{
    configuration_error, revocation_error, ConfigurationErrorKind, Error, RevocationErrorKind,
};
use crate::http::HttpFetch;

/// Protocol details that differ between providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Scopes requested unless `disable_default_scope` is set.
    pub default_scopes: Vec<String>,
    /// Separator used when joining scopes into the `scope` parameter.
    pub scope_joiner: String,
    /// How client credentials are sent to the token endpoint.
    pub authentication: ClientAuthentication,
    /// Static authorization URL parameters (e.g. `access_type=offline`).
    pub authorization_params: Vec<(String, String)>,
    /// Whether construction fails without a client secret.
    pub requires_client_secret: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            default_scopes: Vec::new(),
            scope_joiner: " ".to_string(),
            authentication: ClientAuthentication::RequestBody,
            authorization_params: Vec::new(),
            requires_client_secret: true,
        }
    }
}

impl ClientSettings {
    pub fn with_default_scopes(mut self, scopes: &[&str]) -> Self {
        self.default_scopes = scopes.iter().map(|scope| scope.to_string()).collect();
        self
    }

    pub fn with_scope_joiner(mut self, joiner: &str) -> Self {
        self.scope_joiner = joiner.to_string();
        self
    }

    pub fn with_authentication(mut self, authentication: ClientAuthentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn with_authorization_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.authorization_params.push((name.to_string(), value.into()));
        self
    }

    /// Allow clients without a secret (public clients relying on PKCE).
    pub fn public_client(mut self) -> Self {
        self.requires_client_secret = false;
        self
    }
}

/// One configured provider instance: endpoints, options, settings and transport.
pub struct Client {
    id: String,
    options: ProviderOptions,
    endpoints: Endpoints,
    settings: ClientSettings,
    fetch: Arc<dyn HttpFetch>,
}

impl Client {
    /// Validate the configuration and bind it to a transport.
    ///
    /// Fails with a configuration error when the client id is blank, when a required client
    /// secret is missing, or when the configured redirect URI is not an absolute URL.
    pub fn new(
        id: impl Into<String>,
        options: ProviderOptions,
        endpoints: Endpoints,
        settings: ClientSettings,
        fetch: Arc<dyn HttpFetch>,
    ) -> Result<Self, Error> {
        let id = id.into();

        if options.client_id.trim().is_empty() {
            return Err(configuration_error(
                ConfigurationErrorKind::MissingCredential,
                "client_id is required",
            ));
        }

        let needs_secret = settings.requires_client_secret
            || settings.authentication == ClientAuthentication::BasicAuth;
        let has_secret = options
            .client_secret
            .as_ref()
            .is_some_and(|secret| !secret.expose_secret().is_empty());
        if needs_secret && !has_secret {
            return Err(configuration_error(
                ConfigurationErrorKind::MissingCredential,
                &format!("client_secret is required for provider {}", id),
            ));
        }

        if let Some(redirect_uri) = &options.redirect_uri {
            Url::parse(redirect_uri)?;
        }

        debug!(provider = %id, endpoint = %endpoints.authorization, "Configured OAuth provider");

        Ok(Self {
            id,
            options,
            endpoints,
            settings,
            fetch,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Build the authorization URL for one sign-in attempt.
    pub fn create_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url, Error> {
        let scopes = resolve_scopes(
            self.settings.default_scopes.as_slice(),
            &self.options,
            request.scopes.as_deref(),
        );

        create_authorization_url(AuthorizationUrlParams {
            provider_id: &self.id,
            options: &self.options,
            authorization_endpoint: &self.endpoints.authorization,
            scopes: &scopes,
            scope_joiner: &self.settings.scope_joiner,
            state: &request.state,
            redirect_uri: &request.redirect_uri,
            code_verifier: request.code_verifier.as_deref(),
            login_hint: request.login_hint.as_deref(),
            extra_params: &self.settings.authorization_params,
        })
    }

    /// Exchange an authorization code at the token endpoint.
    pub async fn validate_authorization_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<TokenSet, Error> {
        token::validate_authorization_code(
            self.fetch.as_ref(),
            self.token_endpoint(&self.endpoints.token),
            request,
        )
        .await
    }

    /// Refresh an access token, through the configured override when there is one.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, Error> {
        match &self.options.refresh_access_token {
            RefreshStrategy::Custom(refresh) => {
                debug!(provider = %self.id, "Refreshing access token with custom handler");
                refresh(refresh_token.to_string()).await
            }
            RefreshStrategy::TokenEndpoint => {
                token::refresh_access_token(
                    self.fetch.as_ref(),
                    self.token_endpoint(&self.endpoints.token),
                    refresh_token,
                )
                .await
            }
        }
    }

    /// Revoke a token at the revocation endpoint, if the provider has one.
    pub async fn revoke_token(&self, token: &str) -> Result<(), Error> {
        let Some(revocation) = &self.endpoints.revocation else {
            return Err(revocation_error(
                RevocationErrorKind::Unsupported,
                &format!("provider {} has no revocation endpoint", self.id),
            ));
        };

        token::revoke_token(self.fetch.as_ref(), self.token_endpoint(revocation), token).await
    }

    /// The configured user info override, if any.
    pub fn custom_user_info(&self) -> Option<&GetUserInfoFn> {
        match &self.options.get_user_info {
            UserInfoStrategy::Custom(get_user_info) => Some(get_user_info),
            UserInfoStrategy::UserInfoEndpoint => None,
        }
    }

    /// GET a JSON resource with the access token. `None` on any failure.
    pub async fn fetch_json(&self, endpoint: &Url, tokens: &TokenSet) -> Option<Value> {
        user_info::fetch_json(
            self.fetch.as_ref(),
            &self.id,
            endpoint,
            tokens.access_token.expose_secret(),
        )
        .await
    }

    /// Resolve the user's identity: the override verbatim when configured, otherwise the
    /// user info endpoint decoded as `P` and mapped to a canonical identity.
    pub async fn user_info<P>(&self, tokens: &TokenSet) -> Option<UserInfo>
    where
        P: DeserializeOwned + Into<CanonicalIdentity>,
    {
        if let Some(get_user_info) = self.custom_user_info() {
            return get_user_info(tokens.clone()).await;
        }

        let data = self.fetch_json(&self.endpoints.user_info, tokens).await?;
        user_info::normalize::<P>(&self.id, data)
    }

    fn token_endpoint<'a>(&'a self, endpoint: &'a Url) -> TokenEndpointRequest<'a> {
        TokenEndpointRequest {
            endpoint,
            options: &self.options,
            authentication: self.settings.authentication,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("endpoints", &self.endpoints)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
