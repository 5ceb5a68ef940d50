use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use social_auth::oauth::{
    generate_state, AuthorizationRequest, CodeExchangeRequest, PkceVerifier, Provider,
};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    let provider = match service::init_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to configure OAuth provider: {e}");
            std::process::exit(1);
        }
    };

    let result = match &config.code {
        Some(code) => finish_sign_in(provider.as_ref(), &config, code).await,
        None => start_sign_in(provider.as_ref(), &config),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Print an authorization URL together with the state and verifier the callback needs.
fn start_sign_in(provider: &dyn Provider, config: &Config) -> Result<(), social_auth::Error> {
    let state = config.state.clone().unwrap_or_else(generate_state);
    let verifier = PkceVerifier::generate();

    let mut request = AuthorizationRequest::new(state.clone(), config.oauth_redirect_uri.clone())
        .with_code_verifier(verifier.as_str());
    if let Some(login_hint) = &config.login_hint {
        request = request.with_login_hint(login_hint.clone());
    }

    let url = provider.create_authorization_url(&request)?;
    info!("Starting sign-in with {}", provider.name());

    println!("Open this URL to sign in:\n\n  {url}\n");
    println!("Then run again with:");
    println!("  --code <code> --code-verifier {} --state {}", verifier.as_str(), state);
    Ok(())
}

/// Exchange the authorization code and resolve the signed-in identity.
async fn finish_sign_in(
    provider: &dyn Provider,
    config: &Config,
    code: &str,
) -> Result<(), social_auth::Error> {
    let mut exchange = CodeExchangeRequest::new(code, config.oauth_redirect_uri.clone());
    match &config.code_verifier {
        Some(verifier) => exchange = exchange.with_code_verifier(verifier.clone()),
        None => warn!("No --code-verifier given, exchanging without PKCE"),
    }

    let tokens = provider.validate_authorization_code(&exchange).await?;
    info!(
        "Signed in with {}: refresh_token={}, expires_at={:?}",
        provider.name(),
        tokens.refresh_token.is_some(),
        tokens.expires_at
    );

    match provider.get_user_info(&tokens).await {
        Some(info) => {
            let user = info.user;
            println!("id:             {}", user.id);
            println!("email:          {}", user.email.as_deref().unwrap_or("-"));
            println!("email verified: {}", user.email_verified);
            println!("name:           {}", user.name.as_deref().unwrap_or("-"));
            println!("image:          {}", user.image.as_deref().unwrap_or("-"));
        }
        None => warn!("Tokens were issued but the user profile could not be resolved"),
    }

    Ok(())
}
