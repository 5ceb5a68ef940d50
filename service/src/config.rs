use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use social_auth::error::{configuration_error, ConfigurationErrorKind, Error};
use social_auth::http::HttpClientConfig;
use social_auth::oauth::{ProviderKind, ProviderOptions};
use social_auth::providers::{EndpointUrls, ProviderConfig};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/api/auth/callback";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Identity provider to sign in with: asgardeo, github, google, oidc or zoom.
    #[arg(long, env, value_parser = ProviderKind::from_str)]
    pub oauth_provider: ProviderKind,

    /// Instance id for a generic OIDC provider.
    #[arg(long, env)]
    oauth_provider_id: Option<String>,

    /// Display name for a generic OIDC provider.
    #[arg(long, env)]
    oauth_provider_name: Option<String>,

    /// Tenant issuer URL, e.g. https://api.asgardeo.io/t/acme
    #[arg(long, env)]
    oauth_issuer: Option<String>,

    /// Authorization endpoint URL. Set together with the token and user info endpoints to
    /// override the provider's defaults.
    #[arg(long, env)]
    oauth_authorization_endpoint: Option<String>,

    /// Token endpoint URL.
    #[arg(long, env)]
    oauth_token_endpoint: Option<String>,

    /// User info endpoint URL.
    #[arg(long, env)]
    oauth_user_info_endpoint: Option<String>,

    /// Token revocation endpoint URL.
    #[arg(long, env)]
    oauth_revocation_endpoint: Option<String>,

    /// OAuth client id registered with the provider.
    #[arg(long, env)]
    pub oauth_client_id: String,

    /// OAuth client secret. Optional for public clients that rely on PKCE.
    #[arg(long, env, hide_env_values = true)]
    oauth_client_secret: Option<String>,

    /// Additional client key required by some providers.
    #[arg(long, env, hide_env_values = true)]
    oauth_client_key: Option<String>,

    /// Scopes requested in addition to the provider defaults.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    pub oauth_scopes: Vec<String>,

    /// Request only the configured scopes, without the provider defaults.
    #[arg(long, env)]
    pub oauth_disable_default_scope: bool,

    /// Redirect URI registered with the provider.
    #[arg(long, env, default_value = DEFAULT_REDIRECT_URI)]
    pub oauth_redirect_uri: String,

    /// Value for the `prompt` authorization parameter, e.g. select_account.
    #[arg(long, env)]
    oauth_prompt: Option<String>,

    /// Google Workspace domain to restrict sign-in to.
    #[arg(long, env)]
    oauth_hosted_domain: Option<String>,

    /// Account hint passed to the provider's login page.
    #[arg(long, env)]
    pub login_hint: Option<String>,

    /// Timeout in seconds for requests to provider endpoints
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// User agent sent to provider endpoints
    #[arg(long, env)]
    http_user_agent: Option<String>,

    /// Authorization code received on the redirect back. When set, it is exchanged for tokens.
    #[arg(long)]
    pub code: Option<String>,

    /// PKCE verifier that was used to build the authorization URL.
    #[arg(long)]
    pub code_verifier: Option<String>,

    /// State that was placed in the authorization URL.
    #[arg(long)]
    pub state: Option<String>,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = parse_level_filter,
    )]
    pub log_level_filter: LevelFilter,
}

fn parse_level_filter(level: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(level).map_err(|_| format!("unknown log level: {}", level))
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Explicit endpoints, when configured.
    ///
    /// The authorization, token and user info endpoints go together; setting only some of
    /// them is a configuration error.
    pub fn endpoint_urls(&self) -> Result<Option<EndpointUrls>, Error> {
        match (
            &self.oauth_authorization_endpoint,
            &self.oauth_token_endpoint,
            &self.oauth_user_info_endpoint,
        ) {
            (Some(authorization), Some(token), Some(user_info)) => Ok(Some(EndpointUrls {
                authorization: authorization.clone(),
                token: token.clone(),
                user_info: user_info.clone(),
                revocation: self.oauth_revocation_endpoint.clone(),
            })),
            (None, None, None) => Ok(None),
            _ => Err(configuration_error(
                ConfigurationErrorKind::MissingEndpoint,
                "authorization, token and user info endpoints must be configured together",
            )),
        }
    }

    pub fn provider_options(&self) -> ProviderOptions {
        let mut options = ProviderOptions::new(self.oauth_client_id.clone())
            .with_redirect_uri(self.oauth_redirect_uri.clone());

        if let Some(secret) = &self.oauth_client_secret {
            options = options.with_client_secret(secret.clone());
        }
        if let Some(key) = &self.oauth_client_key {
            options = options.with_client_key(key.clone());
        }
        if !self.oauth_scopes.is_empty() {
            options = options.with_scope(self.oauth_scopes.iter().cloned());
        }
        if self.oauth_disable_default_scope {
            options = options.without_default_scope();
        }
        if let Some(prompt) = &self.oauth_prompt {
            options = options.with_prompt(prompt.clone());
        }

        options
    }

    /// Everything `build_provider` needs for the configured provider.
    pub fn provider_config(&self) -> Result<ProviderConfig, Error> {
        let mut config = ProviderConfig::new(self.oauth_provider, self.provider_options());

        if let Some(endpoints) = self.endpoint_urls()? {
            config = config.with_endpoints(endpoints);
        }
        if let Some(issuer) = &self.oauth_issuer {
            config = config.with_issuer(issuer.clone());
        }
        if let Some(hosted_domain) = &self.oauth_hosted_domain {
            config = config.with_hosted_domain(hosted_domain.clone());
        }
        config.id = self.oauth_provider_id.clone();
        config.name = self.oauth_provider_name.clone();

        Ok(config)
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            ..HttpClientConfig::default()
        };
        if let Some(user_agent) = &self.http_user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}
