use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub mod catalog;
pub mod config;
pub mod error;
pub mod lookup;
pub mod state;
pub mod tools;

pub use catalog::LibraryCatalog;
pub use crate::config::LookupConfig;
pub use error::{ConfigError, LookupError};
pub use lookup::{DocsLookup, LookupReport, PageText, NO_RESULTS};
use state::AppContext;

/// Build the HTTP-backed lookup and the context its tools run against.
pub fn bootstrap(config: &LookupConfig) -> Result<Arc<AppContext>> {
    let lookup = DocsLookup::from_config(config).context("failed to build docs lookup")?;

    info!(
        target: "docs_lookup_core",
        endpoint = %config.search_endpoint,
        result_count = lookup.result_count(),
        fetch_concurrency = lookup.fetch_concurrency(),
        libraries = ?lookup.catalog().libraries().collect::<Vec<_>>(),
        "docs lookup ready"
    );

    Ok(Arc::new(AppContext::new(lookup)))
}
