//! HTTP fetch contract used by the OAuth engine.
//!
//! The engine only looks at the status code and the body of a response. Transport details
//! (timeouts, redirects, TLS) belong to the `HttpFetch` implementation.

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

/// A single outgoing HTTP request.
#[derive(Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request with an `application/x-www-form-urlencoded` body.
    pub fn post_form<'a, I>(url: Url, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();

        Self {
            method: Method::POST,
            url,
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    /// Add a header to the request.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Add an `Authorization: Bearer <token>` header.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Bodies and Authorization headers carry codes, secrets and tokens.
impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "[REDACTED]")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("FetchRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body", &self.body.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Performs HTTP requests on behalf of the OAuth engine.
///
/// Implementations return `Err` only when no HTTP response was obtained. Non-2xx responses are
/// returned as `Ok` so callers can inspect the upstream status and body.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn request(&self, request: FetchRequest) -> Result<FetchResponse, Error>;
}

/// `HttpFetch` implementation backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Wrap an existing reqwest client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn request(&self, request: FetchRequest) -> Result<FetchResponse, Error> {
        let FetchRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_post_form_encodes_body() {
        let url = Url::parse("https://id.example.com/token").unwrap();
        let request = FetchRequest::post_form(
            url,
            [("grant_type", "authorization_code"), ("redirect_uri", "https://app/cb?x=1")],
        );

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body.as_deref(),
            Some("grant_type=authorization_code&redirect_uri=https%3A%2F%2Fapp%2Fcb%3Fx%3D1")
        );
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_debug_redacts_body_and_authorization() {
        let url = Url::parse("https://id.example.com/userinfo").unwrap();
        let request = FetchRequest::post_form(url, [("client_secret", "hunter2")])
            .with_bearer("secret-token");

        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_response_success_range() {
        let ok = FetchResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = FetchResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[tokio::test]
    async fn test_reqwest_fetch_returns_error_statuses_as_data() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer abc")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let fetch = ReqwestFetch::new(reqwest::Client::new());
        let url = Url::parse(&format!("{}/userinfo", server.url())).unwrap();
        let response = fetch
            .request(FetchRequest::get(url).with_bearer("abc"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 401);
        assert_eq!(response.body, "unauthorized");
    }

    #[tokio::test]
    async fn test_reqwest_fetch_sends_form_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded("code".into(), "xyz".into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let fetch = ReqwestFetch::new(reqwest::Client::new());
        let url = Url::parse(&format!("{}/token", server.url())).unwrap();
        let response = fetch
            .request(FetchRequest::post_form(url, [("code", "xyz")]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
    }
}
