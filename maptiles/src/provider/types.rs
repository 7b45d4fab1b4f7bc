//! Provider types

use std::io;
use thiserror::Error;

/// Errors that can occur while fetching a tile.
///
/// Every variant ends up as a FAILED tile; the category only matters for
/// logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),
    /// Server answered with something other than 200
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    /// Payload is not a decodable image
    #[error("Decode error: {0}")]
    Decode(String),
    /// Cache file could not be read or written
    #[error("Filesystem error: {0}")]
    Filesystem(String),
    /// Request was shed because the queue was over its bound
    #[error("Request dropped: queue over capacity")]
    QueueOverflow,
    /// URL scheme the fetcher cannot handle
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self {
        FetchError::Filesystem(e.to_string())
    }
}

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Creates a 200 response with the given body.
    pub fn ok(body: Vec<u8>) -> Self {
        Self::new(200, body)
    }
}
