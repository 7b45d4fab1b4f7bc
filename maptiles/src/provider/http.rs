//! HTTP client abstraction for testability

use super::types::{FetchError, HttpResponse};
use std::time::Duration;
use tracing::trace;

/// User-Agent sent with every tile request.
pub const USER_AGENT: &str = concat!("maptiles/", env!("CARGO_PKG_VERSION"));

/// Trait for synchronous HTTP client operations.
///
/// Fetch workers share one client per [`MapTiles`](crate::tiles::MapTiles)
/// instance, so implementations must be thread-safe. Mock clients stand in
/// for the network in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request with extra request headers.
    ///
    /// Redirects are followed. The status code is returned as-is; judging it
    /// is up to the caller. Transport failures (connect, timeout, body read)
    /// are [`FetchError::Network`].
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, FetchError>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .map_err(|e| FetchError::Network(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        trace!(url = url, status = status, "HTTP response");

        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Network(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}
