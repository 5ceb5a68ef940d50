//! Provider options supplied by whoever configures a provider instance.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use secrecy::SecretString;

use super::token::TokenSet;
use super::user_info::UserInfo;
use crate::error::Error;

/// Boxed, sendable future returned by override functions.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Caller-supplied replacement for the refresh-token grant. Receives the refresh token.
pub type RefreshAccessTokenFn =
    Arc<dyn Fn(String) -> BoxFuture<Result<TokenSet, Error>> + Send + Sync>;

/// Caller-supplied replacement for the user info lookup. Receives the tokens from the exchange.
pub type GetUserInfoFn = Arc<dyn Fn(TokenSet) -> BoxFuture<Option<UserInfo>> + Send + Sync>;

/// How an access token gets refreshed.
#[derive(Clone, Default)]
pub enum RefreshStrategy {
    /// POST `grant_type=refresh_token` to the provider token endpoint.
    #[default]
    TokenEndpoint,
    /// Defer entirely to a caller-supplied function. The engine makes no request of its own.
    Custom(RefreshAccessTokenFn),
}

/// How the user's identity gets resolved.
#[derive(Clone, Default)]
pub enum UserInfoStrategy {
    /// GET the provider user info endpoint and map the profile.
    #[default]
    UserInfoEndpoint,
    /// Defer entirely to a caller-supplied function; its result is returned unmodified.
    Custom(GetUserInfoFn),
}

/// Where client credentials go on token endpoint requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientAuthentication {
    /// `client_id` and `client_secret` form parameters.
    #[default]
    RequestBody,
    /// `Authorization: Basic base64(client_id:client_secret)`.
    BasicAuth,
}

/// Configuration for one provider instance. Immutable once the provider is built.
#[derive(Clone, Default)]
pub struct ProviderOptions {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    /// Extra signing key some providers require next to the client secret.
    pub client_key: Option<SecretString>,
    /// Scopes appended after the provider defaults.
    pub scope: Option<Vec<String>>,
    pub disable_default_scope: bool,
    /// When set, used instead of the redirect URI supplied per request.
    pub redirect_uri: Option<String>,
    /// Passed through as the `prompt` authorization parameter.
    pub prompt: Option<String>,
    pub get_user_info: UserInfoStrategy,
    pub refresh_access_token: RefreshStrategy,
}

impl ProviderOptions {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(SecretString::new(client_key.into()));
        self
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }

    pub fn without_default_scope(mut self) -> Self {
        self.disable_default_scope = true;
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Replace the user info lookup with a custom function.
    pub fn with_get_user_info<F, Fut>(mut self, get_user_info: F) -> Self
    where
        F: Fn(TokenSet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<UserInfo>> + Send + 'static,
    {
        self.get_user_info =
            UserInfoStrategy::Custom(Arc::new(move |tokens| Box::pin(get_user_info(tokens))));
        self
    }

    /// Replace the refresh-token grant with a custom function.
    pub fn with_refresh_access_token<F, Fut>(mut self, refresh_access_token: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TokenSet, Error>> + Send + 'static,
    {
        self.refresh_access_token = RefreshStrategy::Custom(Arc::new(move |refresh_token| {
            Box::pin(refresh_access_token(refresh_token))
        }));
        self
    }
}

impl fmt::Debug for RefreshStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshStrategy::TokenEndpoint => f.write_str("TokenEndpoint"),
            RefreshStrategy::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl fmt::Debug for UserInfoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserInfoStrategy::UserInfoEndpoint => f.write_str("UserInfoEndpoint"),
            UserInfoStrategy::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl fmt::Debug for ProviderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderOptions")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("client_key", &self.client_key.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("disable_default_scope", &self.disable_default_scope)
            .field("redirect_uri", &self.redirect_uri)
            .field("prompt", &self.prompt)
            .field("get_user_info", &self.get_user_info)
            .field("refresh_access_token", &self.refresh_access_token)
            .finish()
    }
}
