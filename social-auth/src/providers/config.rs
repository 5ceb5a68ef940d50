//! Provider configuration and the factory that turns it into a provider instance.

use std::sync::Arc;

use tracing::info;

use crate::error::{configuration_error, ConfigurationErrorKind, Error};
use crate::http::HttpFetch;
use crate::oauth::providers::{asgardeo, github, google, oidc, zoom};
use crate::oauth::{Endpoints, Provider, ProviderKind, ProviderOptions};

/// Endpoint URLs as configured, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointUrls {
    pub authorization: String,
    pub token: String,
    pub user_info: String,
    pub revocation: Option<String>,
}

impl EndpointUrls {
    pub fn parse(&self) -> Result<Endpoints, Error> {
        let endpoints = Endpoints::parse(&self.authorization, &self.token, &self.user_info)?;
        match &self.revocation {
            Some(revocation) => endpoints.with_revocation(revocation),
            None => Ok(endpoints),
        }
    }
}

/// Everything needed to build one provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which adapter to build.
    pub kind: ProviderKind,
    /// Tenant issuer URL (Asgardeo).
    pub issuer: Option<String>,
    /// Explicit endpoints. Required for generic OIDC, overrides the defaults of the others.
    pub endpoints: Option<EndpointUrls>,
    /// Google Workspace domain restriction.
    pub hosted_domain: Option<String>,
    /// Instance id for generic OIDC providers.
    pub id: Option<String>,
    /// Display name for generic OIDC providers.
    pub name: Option<String>,
    pub options: ProviderOptions,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, options: ProviderOptions) -> Self {
        Self {
            kind,
            issuer: None,
            endpoints: None,
            hosted_domain: None,
            id: None,
            name: None,
            options,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointUrls) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn with_hosted_domain(mut self, hosted_domain: impl Into<String>) -> Self {
        self.hosted_domain = Some(hosted_domain.into());
        self
    }

    pub fn with_identity(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.name = Some(name.into());
        self
    }

    fn explicit_endpoints(&self) -> Result<Option<Endpoints>, Error> {
        self.endpoints.as_ref().map(EndpointUrls::parse).transpose()
    }
}

/// Build a provider from configuration alone.
///
/// Instances share nothing but the transport, so differently configured providers of the
/// same kind can coexist.
pub fn build_provider(
    config: ProviderConfig,
    fetch: Arc<dyn HttpFetch>,
) -> Result<Arc<dyn Provider>, Error> {
    let endpoints = config.explicit_endpoints()?;

    let provider: Arc<dyn Provider> = match config.kind {
        ProviderKind::Asgardeo => match (endpoints, config.issuer.as_deref()) {
            (Some(endpoints), _) => Arc::new(asgardeo::Provider::with_endpoints(
                endpoints,
                config.options,
                fetch,
            )?),
            (None, Some(issuer)) => {
                Arc::new(asgardeo::Provider::new(issuer, config.options, fetch)?)
            }
            (None, None) => {
                return Err(configuration_error(
                    ConfigurationErrorKind::MissingEndpoint,
                    "asgardeo requires an issuer or explicit endpoints",
                ))
            }
        },
        ProviderKind::Oidc => {
            let endpoints = endpoints.ok_or_else(|| {
                configuration_error(
                    ConfigurationErrorKind::MissingEndpoint,
                    "oidc requires explicit endpoints",
                )
            })?;
            let id = config.id.unwrap_or_else(|| ProviderKind::Oidc.to_string());
            let name = config.name.unwrap_or_else(|| id.clone());
            Arc::new(oidc::Provider::new(id, name, endpoints, config.options, fetch)?)
        }
        ProviderKind::Google => {
            let endpoints = match endpoints {
                Some(endpoints) => endpoints,
                None => google::default_endpoints()?,
            };
            Arc::new(google::Provider::with_endpoints(
                endpoints,
                config.options,
                config.hosted_domain,
                fetch,
            )?)
        }
        ProviderKind::GitHub => {
            let endpoints = match endpoints {
                Some(endpoints) => endpoints,
                None => github::default_endpoints()?,
            };
            Arc::new(github::Provider::with_endpoints(endpoints, config.options, fetch)?)
        }
        ProviderKind::Zoom => {
            let endpoints = match endpoints {
                Some(endpoints) => endpoints,
                None => zoom::default_endpoints()?,
            };
            Arc::new(zoom::Provider::with_endpoints(endpoints, config.options, fetch)?)
        }
    };

    info!(
        kind = %provider.kind(),
        id = provider.id(),
        "Built OAuth provider"
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::testing::RecordingFetch;
    use crate::oauth::AuthorizationRequest;

    fn fetch() -> Arc<dyn HttpFetch> {
        Arc::new(RecordingFetch::empty())
    }

    fn options() -> ProviderOptions {
        ProviderOptions::new("client-1").with_client_secret("secret-1")
    }

    fn urls() -> EndpointUrls {
        EndpointUrls {
            authorization: "https://sso.example.com/authorize".to_string(),
            token: "https://sso.example.com/token".to_string(),
            user_info: "https://sso.example.com/userinfo".to_string(),
            revocation: None,
        }
    }

    #[test]
    fn test_build_each_kind() {
        let configs = vec![
            ProviderConfig::new(ProviderKind::Asgardeo, options())
                .with_issuer("https://api.asgardeo.io/t/acme"),
            ProviderConfig::new(ProviderKind::Oidc, options()).with_endpoints(urls()),
            ProviderConfig::new(ProviderKind::Google, options()),
            ProviderConfig::new(ProviderKind::GitHub, options()),
            ProviderConfig::new(ProviderKind::Zoom, options()),
        ];

        for config in configs {
            let kind = config.kind;
            let provider = build_provider(config, fetch()).unwrap();
            assert_eq!(provider.kind(), kind);
            assert_eq!(provider.options().client_id, "client-1");
        }
    }

    #[test]
    fn test_tenants_coexist() {
        let staging = build_provider(
            ProviderConfig::new(ProviderKind::Asgardeo, options())
                .with_issuer("https://api.asgardeo.io/t/staging"),
            fetch(),
        )
        .unwrap();
        let production = build_provider(
            ProviderConfig::new(ProviderKind::Asgardeo, ProviderOptions::new("client-2"))
                .with_issuer("https://api.asgardeo.io/t/production"),
            fetch(),
        )
        .unwrap();

        let request = AuthorizationRequest::new("st", "https://app.example.com/cb");
        let staging_url = staging.create_authorization_url(&request).unwrap();
        let production_url = production.create_authorization_url(&request).unwrap();

        assert_eq!(staging_url.path(), "/t/staging/oauth2/authorize");
        assert_eq!(production_url.path(), "/t/production/oauth2/authorize");
        assert_eq!(staging.options().client_id, "client-1");
        assert_eq!(production.options().client_id, "client-2");
    }

    #[test]
    fn test_explicit_endpoints_override_defaults() {
        let provider = build_provider(
            ProviderConfig::new(ProviderKind::GitHub, options()).with_endpoints(urls()),
            fetch(),
        )
        .unwrap();
        assert_eq!(provider.endpoints().token.as_str(), "https://sso.example.com/token");
    }

    #[test]
    fn test_oidc_identity() {
        let provider = build_provider(
            ProviderConfig::new(ProviderKind::Oidc, options())
                .with_endpoints(urls())
                .with_identity("corp", "Corp SSO"),
            fetch(),
        )
        .unwrap();
        assert_eq!(provider.id(), "corp");
        assert_eq!(provider.name(), "Corp SSO");

        let defaulted = build_provider(
            ProviderConfig::new(ProviderKind::Oidc, options()).with_endpoints(urls()),
            fetch(),
        )
        .unwrap();
        assert_eq!(defaulted.id(), "oidc");
    }

    #[test]
    fn test_missing_endpoints() {
        for kind in [ProviderKind::Asgardeo, ProviderKind::Oidc] {
            let err = build_provider(ProviderConfig::new(kind, options()), fetch()).unwrap_err();
            assert_eq!(
                err.error_kind,
                ErrorKind::Configuration(ConfigurationErrorKind::MissingEndpoint)
            );
        }
    }

    #[test]
    fn test_malformed_endpoint() {
        let mut urls = urls();
        urls.token = "not a url".to_string();
        let err = build_provider(
            ProviderConfig::new(ProviderKind::Oidc, options()).with_endpoints(urls),
            fetch(),
        )
        .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Configuration(ConfigurationErrorKind::InvalidEndpoint)
        );
    }
}
