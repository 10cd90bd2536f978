pub mod content;
pub mod http;

pub use content::{ContentFetcher, FetchedPage, RetryPolicy};
pub use http::ReqwestTransport;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Status and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that produced no response
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

// Base trait for anything that can GET a page
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request bounded by `timeout`
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}
