use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{ClientConfig, ClientError};

pub const SERPER_URL: &str = "https://google.serper.dev/search";

/// Payload posted to the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "q")]
    pub query: String,
    pub num: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, num: usize) -> Self {
        Self {
            query: query.into(),
            num,
        }
    }
}

/// A non-sponsored result entry. Only `link` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the top organic results in provider order.
    ///
    /// A timed-out search yields an empty list instead of an error.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<OrganicResult>, ClientError>;
}

/// Search credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug)]
pub struct SerperClient {
    http: Client,
    endpoint: String,
    api_key: ApiKey,
}

impl SerperClient {
    pub fn new(api_key: ApiKey, config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_endpoint(api_key, SERPER_URL, config)
    }

    pub fn with_endpoint(
        api_key: ApiKey,
        endpoint: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: config.build_http()?,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    #[instrument(name = "docs_lookup_client.search", skip(self, request), fields(q = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<OrganicResult>, ClientError> {
        let response = match self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose())
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) if error.is_timeout() => {
                warn!(target: "docs_lookup_client", endpoint = %self.endpoint, "search timed out; treating as no results");
                return Ok(Vec::new());
            }
            Err(error) => return Err(ClientError::Http(error.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(target: "docs_lookup_client", %status, endpoint = %self.endpoint, "search request failed");
            return Err(ClientError::Status(status));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) if error.is_timeout() => {
                warn!(target: "docs_lookup_client", endpoint = %self.endpoint, "search body timed out; treating as no results");
                return Ok(Vec::new());
            }
            Err(error) => return Err(ClientError::Http(error.to_string())),
        };

        let parsed: SerperResponse = serde_json::from_slice(&bytes)
            .map_err(|error| ClientError::Decode(error.to_string()))?;
        let mut results = parsed.organic;
        results.truncate(request.num);
        debug!(target: "docs_lookup_client", results = results.len(), "search completed");
        Ok(results)
    }
}
