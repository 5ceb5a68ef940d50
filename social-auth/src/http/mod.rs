//! HTTP transport used to reach provider endpoints.

mod client;
mod fetch;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpClientBuilder, HttpClientConfig};
pub use fetch::{FetchRequest, FetchResponse, HttpFetch, ReqwestFetch};
