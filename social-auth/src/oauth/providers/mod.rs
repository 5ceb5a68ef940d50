//! Provider adapters. Each one binds the shared [`Client`](crate::oauth::Client) engine to a
//! provider's endpoints, settings and profile mapping.

pub mod asgardeo;
pub mod github;
pub mod google;
pub mod oidc;
pub mod zoom;
