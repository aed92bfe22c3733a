//! Fetcher boundary - retrieves configuration documents and bootstrap sources

use async_trait::async_trait;
use thiserror::Error;

mod http;

pub use http::HttpFetcher;

/// Errors that can occur while fetching a URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Text retrieval over the network (or anything that looks like it)
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its body; non-success statuses are errors
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}
