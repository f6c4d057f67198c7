//! # contract: the network seam
//!
//! Every component that talks to the repository does so through the single
//! [`Fetcher`] trait defined here, so traversal, aggregation, projection and
//! term lookup can be driven against a synthetic backend in tests.
//!
//! ## Implementations
//! - [`crate::fetch::HttpFetcher`]: reqwest client with optional Basic auth,
//!   backed by the advisory [`crate::cache::DiskCache`].
//! - `MockFetcher`: generated by `mockall` under `cfg(test)` or the
//!   `test-export-mocks` feature.
//!
//! ## Contract
//! - `fetch` returns the raw response body for a 2xx response.
//! - A non-2xx response is [`FetchError::HttpStatus`]; implementations
//!   never retry.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::FetchError;

/// GET a URL and return its body.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
