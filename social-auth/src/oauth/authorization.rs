//! Authorization URL construction.
//!
//! Pure: no network I/O and no state is kept. The `state` and PKCE verifier are produced and
//! remembered by the caller; this module only places them into the URL.

use std::borrow::Cow;

use tracing::trace;
use url::Url;

use super::{PkceChallenge, ProviderOptions};
use crate::error::{configuration_error, ConfigurationErrorKind, Error};

/// Query parameters owned by the engine. Provider-specific extras never replace these.
const RESERVED_PARAMS: &[&str] = &[
    "response_type",
    "client_id",
    "redirect_uri",
    "state",
    "scope",
    "code_challenge",
    "code_challenge_method",
    "login_hint",
    "prompt",
];

/// Per-attempt input for building an authorization URL.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    /// CSRF state parameter; the caller validates it on the redirect back.
    pub state: String,
    /// Scopes requested for this attempt, appended after the configured ones.
    pub scopes: Option<Vec<String>>,
    /// PKCE verifier; only its S256 challenge is placed in the URL.
    pub code_verifier: Option<String>,
    /// Hint about the account the user is expected to sign in with.
    pub login_hint: Option<String>,
    /// Where the provider sends the user back.
    pub redirect_uri: String,
}

impl AuthorizationRequest {
    pub fn new(state: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_code_verifier(mut self, code_verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(code_verifier.into());
        self
    }

    pub fn with_login_hint(mut self, login_hint: impl Into<String>) -> Self {
        self.login_hint = Some(login_hint.into());
        self
    }
}

/// Everything [`create_authorization_url`] needs, borrowed from the provider and the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationUrlParams<'a> {
    pub provider_id: &'a str,
    pub options: &'a ProviderOptions,
    pub authorization_endpoint: &'a Url,
    /// Already resolved, see [`resolve_scopes`].
    pub scopes: &'a [String],
    pub scope_joiner: &'a str,
    pub state: &'a str,
    pub redirect_uri: &'a str,
    pub code_verifier: Option<&'a str>,
    pub login_hint: Option<&'a str>,
    /// Provider-specific parameters appended after the standard ones.
    pub extra_params: &'a [(String, String)],
}

/// Build the ordered scope list: provider defaults (unless disabled), then the configured
/// scopes, then the scopes requested for this attempt. Duplicates are kept.
pub fn resolve_scopes<S: AsRef<str>>(
    defaults: &[S],
    options: &ProviderOptions,
    requested: Option<&[String]>,
) -> Vec<String> {
    let defaults: &[S] = if options.disable_default_scope {
        &[]
    } else {
        defaults
    };

    defaults
        .iter()
        .map(|scope| scope.as_ref().to_string())
        .chain(options.scope.iter().flatten().cloned())
        .chain(requested.into_iter().flatten().cloned())
        .collect()
}

/// Build the provider authorization URL for the authorization code flow.
///
/// Fails only when no redirect URI is available at all.
pub fn create_authorization_url(params: AuthorizationUrlParams<'_>) -> Result<Url, Error> {
    let redirect_uri = params
        .options
        .redirect_uri
        .as_deref()
        .unwrap_or(params.redirect_uri);
    if redirect_uri.is_empty() {
        return Err(configuration_error(
            ConfigurationErrorKind::MissingRedirectUri,
            "no redirect URI configured or supplied",
        ));
    }

    let scope = params.scopes.join(params.scope_joiner);

    let mut query: Vec<(&str, Cow<'_, str>)> = vec![
        ("response_type", Cow::Borrowed("code")),
        ("scope", Cow::Owned(scope)),
        ("state", Cow::Borrowed(params.state)),
        ("redirect_uri", Cow::Borrowed(redirect_uri)),
        ("client_id", Cow::Borrowed(params.options.client_id.as_str())),
    ];

    if let Some(login_hint) = params.login_hint {
        query.push(("login_hint", Cow::Borrowed(login_hint)));
    }
    if let Some(prompt) = &params.options.prompt {
        query.push(("prompt", Cow::Borrowed(prompt.as_str())));
    }
    if let Some(verifier) = params.code_verifier {
        let challenge = PkceChallenge::from_verifier(verifier);
        query.push(("code_challenge_method", Cow::Borrowed(PkceChallenge::METHOD)));
        query.push(("code_challenge", Cow::Owned(challenge.as_str().to_string())));
    }
    for (name, value) in params.extra_params {
        if !RESERVED_PARAMS.contains(&name.as_str()) {
            query.push((name.as_str(), Cow::Borrowed(value.as_str())));
        }
    }

    // `urlencoding` encodes spaces as %20, which every provider accepts in `scope`.
    let encoded = query
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    // A query already on the endpoint is kept, minus the parameters set above.
    let mut url = params.authorization_endpoint.clone();
    let kept = url
        .query_pairs()
        .filter(|(name, _)| !RESERVED_PARAMS.contains(&&**name))
        .map(|(name, value)| {
            format!("{}={}", urlencoding::encode(&name), urlencoding::encode(&value))
        })
        .collect::<Vec<_>>();
    let merged = if kept.is_empty() {
        encoded
    } else {
        format!("{}&{}", kept.join("&"), encoded)
    };
    url.set_query(Some(&merged));

    trace!(
        provider = params.provider_id,
        pkce = params.code_verifier.is_some(),
        scopes = params.scopes.len(),
        "Built authorization URL"
    );

    Ok(url)
}
