pub mod fetch;
pub mod html;
pub mod search;

pub use fetch::{FetchedPage, HttpPageFetcher, PageFetcher, TIMEOUT_PLACEHOLDER};
pub use search::{ApiKey, OrganicResult, SearchProvider, SearchRequest, SerperClient, SERPER_URL};

use std::time::Duration;

pub use reqwest::StatusCode;

use reqwest::Client;
use thiserror::Error;

/// User agent sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = "docs-app/1.0";
/// Upper bound applied to each search and page request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("unexpected status code: {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn build_http(&self) -> Result<Client, ClientError> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .build()
            .map_err(|error| ClientError::Build(error.to_string()))
    }
}
