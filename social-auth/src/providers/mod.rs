//! Configuration-driven provider construction.

mod config;

pub use config::{build_provider, EndpointUrls, ProviderConfig};
