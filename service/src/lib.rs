use std::sync::Arc;

use config::Config;
use log::info;
use social_auth::http::HttpClientBuilder;
use social_auth::oauth::Provider;
use social_auth::providers::build_provider;
use social_auth::Error;

pub mod config;
pub mod logging;

/// Build the configured provider over a fresh HTTP client.
pub fn init_provider(config: &Config) -> Result<Arc<dyn Provider>, Error> {
    let http_config = config.http_client_config();
    info!(
        "Provider HTTP config: timeout={}s, connect_timeout={}s, user_agent={}",
        http_config.timeout.as_secs(),
        http_config.connect_timeout.as_secs(),
        http_config.user_agent,
    );

    let fetch = HttpClientBuilder::with_config(http_config).build()?;
    build_provider(config.provider_config()?, Arc::new(fetch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use social_auth::error::{ConfigurationErrorKind, ErrorKind};
    use social_auth::oauth::ProviderKind;

    #[test]
    fn test_init_provider_from_arguments() {
        let config = Config::try_parse_from([
            "social_auth_rs",
            "--oauth-provider",
            "asgardeo",
            "--oauth-client-id",
            "client-1",
            "--oauth-issuer",
            "https://api.asgardeo.io/t/acme/",
        ])
        .unwrap();

        let provider = init_provider(&config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Asgardeo);
        assert_eq!(
            provider.endpoints().token.as_str(),
            "https://api.asgardeo.io/t/acme/oauth2/token"
        );
    }

    #[test]
    fn test_init_provider_reports_missing_secret() {
        // Passed explicitly so an OAUTH_CLIENT_SECRET in the environment cannot satisfy it.
        let config = Config::try_parse_from([
            "social_auth_rs",
            "--oauth-provider",
            "google",
            "--oauth-client-id",
            "client-1",
            "--oauth-client-secret",
            "",
            "--oauth-redirect-uri",
            "http://localhost:3000/api/auth/callback",
        ])
        .unwrap();

        let err = init_provider(&config).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Configuration(ConfigurationErrorKind::MissingCredential)
        );
    }
}
