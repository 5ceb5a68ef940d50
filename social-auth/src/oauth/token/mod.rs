//! Token endpoint engine: code exchange, refresh, revocation and the resulting token set.

mod exchange;
mod tokens;

pub use exchange::{
    refresh_access_token, revoke_token, validate_authorization_code, CodeExchangeRequest,
    TokenEndpointRequest,
};
pub use tokens::TokenSet;
