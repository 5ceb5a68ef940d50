//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde_json::{Map, Value};

/// Tokens returned by a provider token endpoint.
///
/// Only `access_token` is guaranteed. Every other field is optional and left `None` when the
/// provider omits it or sends something unexpected.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// OpenID Connect ID token, passed through undecoded.
    pub id_token: Option<SecretString>,
    /// Token type (usually "Bearer").
    pub token_type: Option<String>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the refresh token expires, for providers that say so.
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// Granted scopes.
    pub scopes: Option<Vec<String>>,
}

impl TokenSet {
    /// A token set holding nothing but a bearer access token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: None,
            id_token: None,
            token_type: Some("Bearer".to_string()),
            expires_at: None,
            refresh_token_expires_at: None,
            scopes: None,
        }
    }

    /// Map a decoded token endpoint response.
    ///
    /// Returns `None` when the response has no usable `access_token`.
    pub fn from_response(response: &Map<String, Value>, now: DateTime<Utc>) -> Option<Self> {
        let access_token = string_field(response, "access_token")?;

        Some(Self {
            access_token: SecretString::new(access_token),
            refresh_token: string_field(response, "refresh_token").map(SecretString::new),
            id_token: string_field(response, "id_token").map(SecretString::new),
            token_type: string_field(response, "token_type"),
            expires_at: seconds_field(response, "expires_in").and_then(|secs| offset(now, secs)),
            refresh_token_expires_at: seconds_field(response, "refresh_token_expires_in")
                .and_then(|secs| offset(now, secs)),
            scopes: scopes_field(response, "scope"),
        })
    }

    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }
}

fn string_field(response: &Map<String, Value>, key: &str) -> Option<String> {
    match response.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

// Some providers send `expires_in` as a string.
fn seconds_field(response: &Map<String, Value>, key: &str) -> Option<i64> {
    match response.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn offset(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    if secs < 0 {
        return None;
    }
    Duration::try_seconds(secs).and_then(|delta| now.checked_add_signed(delta))
}

// `scope` is a space-delimited string per RFC 6749, but GitHub uses commas and a few
// providers send a JSON array.
fn scopes_field(response: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let scopes: Vec<String> = match response.get(key)? {
        Value::String(s) => s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|scope| !scope.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter(|scope| !scope.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };

    if scopes.is_empty() {
        None
    } else {
        Some(scopes)
    }
}
