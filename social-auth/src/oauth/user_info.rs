//! User info retrieval and normalization.
//!
//! Failures here are soft: a profile that cannot be fetched or decoded yields `None` and the
//! caller decides whether sign-in can continue without it. Profile values are never logged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::error::Category;
use serde_json::Value;
use tracing::{trace, warn};
use url::Url;

use crate::http::{FetchRequest, HttpFetch};

/// Provider-agnostic user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    /// Provider's unique user identifier.
    pub id: String,
    /// User's email address.
    pub email: Option<String>,
    /// Whether the provider vouches for the email address.
    pub email_verified: bool,
    /// User's display name.
    pub name: Option<String>,
    /// User's profile picture URL.
    pub image: Option<String>,
}

/// Normalized identity together with the raw provider profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: CanonicalIdentity,
    pub data: Value,
}

/// GET a JSON document with a bearer token. `None` on transport, status or decoding failure.
pub async fn fetch_json(
    fetch: &dyn HttpFetch,
    provider_id: &str,
    endpoint: &Url,
    access_token: &str,
) -> Option<Value> {
    let request = FetchRequest::get(endpoint.clone())
        .with_bearer(access_token)
        .with_header("Accept", "application/json");

    let response = match fetch.request(request).await {
        Ok(response) => response,
        Err(err) => {
            warn!(provider = provider_id, error = %err, "User info request failed");
            return None;
        }
    };

    if !response.is_success() {
        warn!(
            provider = provider_id,
            status = response.status,
            "User info endpoint returned an error status"
        );
        return None;
    }

    match response.json::<Value>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(provider = provider_id, error = %err, "User info response is not JSON");
            None
        }
    }
}

/// Decode a raw profile into a provider's typed profile struct.
pub fn decode_profile<P: DeserializeOwned>(provider_id: &str, data: &Value) -> Option<P> {
    if let Value::Object(fields) = data {
        trace!(
            provider = provider_id,
            fields = ?fields.keys().collect::<Vec<_>>(),
            "Decoding profile"
        );
    }

    match P::deserialize(data) {
        Ok(profile) => Some(profile),
        Err(err) => {
            warn!(
                provider = provider_id,
                reason = decode_failure(&err),
                "Profile could not be decoded"
            );
            None
        }
    }
}

/// Loggable description of a decoding failure.
///
/// serde_json messages quote the offending value (`invalid type: string "..."`), so only the
/// error category is reported.
fn decode_failure(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Data => "profile does not match the expected shape",
        Category::Syntax => "profile is not valid JSON",
        Category::Eof => "profile is truncated",
        Category::Io => "profile could not be read",
    }
}

/// Decode a raw profile and map it to the canonical identity.
pub fn normalize<P>(provider_id: &str, data: Value) -> Option<UserInfo>
where
    P: DeserializeOwned + Into<CanonicalIdentity>,
{
    let profile: P = decode_profile(provider_id, &data)?;
    Some(UserInfo {
        user: profile.into(),
        data,
    })
}

/// Join given and family names, skipping whichever is missing.
pub fn full_name(given: Option<&str>, family: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [given, family]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// `Some` only for non-blank strings.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Serde helpers for loosely typed provider profiles.
pub mod de {
    use serde::de::Error as _;

    use super::*;

    /// Accept `true`/`false`, `"true"`/`"false"` and `0`/`1`. Anything else is `None`.
    pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(value)) => Some(value),
            Some(Value::String(value)) => value.trim().to_ascii_lowercase().parse().ok(),
            Some(Value::Number(value)) => value.as_i64().map(|n| n != 0),
            _ => None,
        })
    }

    /// Identifier that may arrive as a string or a number.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(value) if !value.is_empty() => Ok(value),
            Value::Number(value) => Ok(value.to_string()),
            _ => Err(D::Error::custom("expected a non-empty string or number identifier")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::RecordingFetch;
    use crate::http::FetchResponse;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Profile {
        #[serde(deserialize_with = "de::string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "de::lenient_bool")]
        verified: Option<bool>,
    }

    impl From<Profile> for CanonicalIdentity {
        fn from(profile: Profile) -> Self {
            CanonicalIdentity {
                id: profile.id,
                email: None,
                email_verified: profile.verified.unwrap_or(false),
                name: None,
                image: None,
            }
        }
    }

    fn endpoint() -> Url {
        Url::parse("https://id.example.com/userinfo").unwrap()
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name(Some("A"), Some("B")).as_deref(), Some("A B"));
        assert_eq!(full_name(Some("A"), None).as_deref(), Some("A"));
        assert_eq!(full_name(None, Some(" B ")).as_deref(), Some("B"));
        assert_eq!(full_name(Some(""), None), None);
        assert_eq!(full_name(None, None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x".to_string())).as_deref(), Some("x"));
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_lenient_fields() {
        let numeric: Profile = serde_json::from_value(json!({"id": 42, "verified": 1})).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.verified, Some(true));

        let stringly: Profile =
            serde_json::from_value(json!({"id": "abc", "verified": "false"})).unwrap();
        assert_eq!(stringly.verified, Some(false));

        let odd: Profile = serde_json::from_value(json!({"id": "abc", "verified": [1]})).unwrap();
        assert_eq!(odd.verified, None);

        let absent: Profile = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(absent.verified, None);
    }

    #[test]
    fn test_normalize_missing_identifier_is_none() {
        assert!(normalize::<Profile>("test", json!({"verified": true})).is_none());
        assert!(normalize::<Profile>("test", json!({"id": ""})).is_none());
        assert!(normalize::<Profile>("test", json!("not an object")).is_none());
    }

    #[test]
    fn test_decode_failure_hides_profile_values() {
        let data = json!(["octo@private.example.com"]);
        let err = Vec::<Profile>::deserialize(&data).unwrap_err();

        assert!(err.to_string().contains("octo@private.example.com"));
        let reason = decode_failure(&err);
        assert!(!reason.contains("octo@private.example.com"));
        assert_eq!(reason, "profile does not match the expected shape");
        assert!(decode_profile::<Vec<Profile>>("test", &data).is_none());
    }

    #[test]
    fn test_normalize_keeps_raw_data() {
        let data = json!({"id": 7, "extra": {"nested": true}});
        let info = normalize::<Profile>("test", data.clone()).unwrap();
        assert_eq!(info.user.id, "7");
        assert_eq!(info.data, data);
    }

    #[tokio::test]
    async fn test_fetch_json_sends_bearer_token() {
        let fetch = RecordingFetch::new(vec![FetchResponse {
            status: 200,
            body: r#"{"id":"1"}"#.to_string(),
        }]);

        let value = fetch_json(&fetch, "test", &endpoint(), "tok").await;
        assert_eq!(value, Some(json!({"id": "1"})));

        let requests = fetch.requests();
        assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(requests[0].method, reqwest::Method::GET);
    }

    #[tokio::test]
    async fn test_fetch_json_soft_failures() {
        let error_status = RecordingFetch::new(vec![FetchResponse {
            status: 401,
            body: r#"{"error":"invalid_token"}"#.to_string(),
        }]);
        assert!(fetch_json(&error_status, "test", &endpoint(), "tok").await.is_none());

        let not_json = RecordingFetch::new(vec![FetchResponse {
            status: 200,
            body: "<html>".to_string(),
        }]);
        assert!(fetch_json(&not_json, "test", &endpoint(), "tok").await.is_none());

        let transport = RecordingFetch::empty();
        assert!(fetch_json(&transport, "test", &endpoint(), "tok").await.is_none());
    }
}
