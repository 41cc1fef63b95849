use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{html, ClientConfig, ClientError};

/// Text substituted for a page that did not answer in time.
pub const TIMEOUT_PLACEHOLDER: &str = "Timeout error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedPage {
    pub text: String,
    pub timed_out: bool,
}

impl FetchedPage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            text: TIMEOUT_PLACEHOLDER.to_string(),
            timed_out: true,
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its visible text.
    async fn fetch_text(&self, url: &str) -> Result<FetchedPage, ClientError>;
}

#[derive(Debug)]
pub struct HttpPageFetcher {
    http: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: config.build_http()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[instrument(name = "docs_lookup_client.fetch_text", skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<FetchedPage, ClientError> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(error) if error.is_timeout() => {
                warn!(target: "docs_lookup_client", url, "page fetch timed out");
                return Ok(FetchedPage::timed_out());
            }
            Err(error) => return Err(ClientError::Http(error.to_string())),
        };

        // Error pages are still rendered to text.
        let status = response.status();
        if !status.is_success() {
            warn!(target: "docs_lookup_client", %status, url, "page fetch returned non-success status");
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(error) if error.is_timeout() => {
                warn!(target: "docs_lookup_client", url, "page body timed out");
                return Ok(FetchedPage::timed_out());
            }
            Err(error) => return Err(ClientError::Http(error.to_string())),
        };

        let text = html::extract_text(&body);
        debug!(target: "docs_lookup_client", url, bytes = body.len(), chars = text.len(), "page extracted");
        Ok(FetchedPage::new(text))
    }
}
