use docs_lookup_client::ClientError;
use thiserror::Error;

/// Failure of a single lookup invocation.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unsupported library `{library}` (supported: {})", .supported.join(", "))]
    UnsupportedLibrary {
        library: String,
        supported: Vec<String>,
    },
    #[error("search provider failed: {0}")]
    SearchProvider(#[source] ClientError),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ClientError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing search API key: set SERPER_API_KEY or DOCS_LOOKUP_API_KEY")]
    MissingCredential,
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
}
