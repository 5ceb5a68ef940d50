//! Error types for the `social-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct holding an
//! error kind enum and an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for social-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in social-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Configuration(ConfigurationErrorKind),
    TokenExchange(TokenExchangeErrorKind),
    Revocation(RevocationErrorKind),
    Http(HttpErrorKind),
}

/// Errors raised while building a provider or an authorization URL.
#[derive(Debug, PartialEq)]
pub enum ConfigurationErrorKind {
    InvalidEndpoint,
    MissingCredential,
    MissingRedirectUri,
    MissingEndpoint,
}

/// Status and body returned by a token or revocation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Errors from the token endpoint, for both code exchange and refresh.
#[derive(Debug, PartialEq)]
pub enum TokenExchangeErrorKind {
    /// The request never produced an HTTP response.
    Network,
    /// The endpoint answered with a non-2xx status.
    Rejected(UpstreamResponse),
    /// The endpoint answered 2xx but the body is not a JSON object.
    InvalidResponse(UpstreamResponse),
    /// The endpoint answered 2xx without an `access_token`.
    MissingAccessToken(UpstreamResponse),
}

/// Errors from token revocation.
#[derive(Debug, PartialEq)]
pub enum RevocationErrorKind {
    Unsupported,
    Network,
    Rejected(UpstreamResponse),
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// Upstream status and body, when the error came from a provider endpoint.
    pub fn upstream(&self) -> Option<&UpstreamResponse> {
        match &self.error_kind {
            ErrorKind::TokenExchange(TokenExchangeErrorKind::Rejected(upstream))
            | ErrorKind::TokenExchange(TokenExchangeErrorKind::InvalidResponse(upstream))
            | ErrorKind::TokenExchange(TokenExchangeErrorKind::MissingAccessToken(upstream))
            | ErrorKind::Revocation(RevocationErrorKind::Rejected(upstream)) => Some(upstream),
            _ => None,
        }
    }
}

impl fmt::Display for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The body can carry tokens; it stays reachable through `Error::upstream()` only.
        write!(f, "status {}, {} byte body", self.status, self.body.len())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Configuration(kind) => write!(f, "Configuration error: {:?}", kind)?,
            ErrorKind::TokenExchange(TokenExchangeErrorKind::Network) => {
                write!(f, "Token exchange error: network")?
            }
            ErrorKind::TokenExchange(TokenExchangeErrorKind::Rejected(upstream)) => {
                write!(f, "Token exchange error: rejected ({})", upstream)?
            }
            ErrorKind::TokenExchange(TokenExchangeErrorKind::InvalidResponse(upstream)) => {
                write!(f, "Token exchange error: invalid response ({})", upstream)?
            }
            ErrorKind::TokenExchange(TokenExchangeErrorKind::MissingAccessToken(upstream)) => {
                write!(f, "Token exchange error: missing access_token ({})", upstream)?
            }
            ErrorKind::Revocation(kind) => write!(f, "Revocation error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Configuration(ConfigurationErrorKind::InvalidEndpoint),
        }
    }
}

/// Helper function to create configuration errors.
pub fn configuration_error(kind: ConfigurationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Configuration(kind),
    }
}

/// Helper function to create token exchange errors.
pub fn token_exchange_error(kind: TokenExchangeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::TokenExchange(kind),
    }
}

/// Helper function to create revocation errors.
pub fn revocation_error(kind: RevocationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Revocation(kind),
    }
}
