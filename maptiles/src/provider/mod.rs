//! Tile download abstraction
//!
//! Fetch workers talk to the network through the [`HttpClient`] trait. The
//! default implementation is [`ReqwestClient`]; tests inject mocks.
//!
//! ```ignore
//! use maptiles::provider::{HttpClient, ReqwestClient};
//! use std::time::Duration;
//!
//! let client = ReqwestClient::new(Duration::from_secs(5))?;
//! let response = client.get("https://tile.openstreetmap.org/0/0/0.png", &[])?;
//! assert_eq!(response.status, 200);
//! ```

mod http;
mod types;

pub use http::{HttpClient, ReqwestClient, USER_AGENT};
pub use types::{FetchError, HttpResponse};

#[cfg(test)]
pub use http::tests::{MockHttpClient, RecordedRequest};
