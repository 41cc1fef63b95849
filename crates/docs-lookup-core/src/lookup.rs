use std::sync::Arc;

use docs_lookup_client::{
    HttpPageFetcher, PageFetcher, SearchProvider, SearchRequest, SerperClient,
};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    catalog::LibraryCatalog,
    config::{LookupConfig, DEFAULT_FETCH_CONCURRENCY, DEFAULT_RESULT_COUNT},
    error::{ConfigError, LookupError},
};

/// Returned in place of page text when the search finds nothing.
pub const NO_RESULTS: &str = "No results found";

/// Text extracted from one search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub timed_out: bool,
}

/// Outcome of one lookup, pages in search-result order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupReport {
    pub library: String,
    pub scoped_query: String,
    pub pages: Vec<PageText>,
}

impl LookupReport {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page texts concatenated without separators, or [`NO_RESULTS`].
    pub fn text(&self) -> String {
        if self.pages.is_empty() {
            return NO_RESULTS.to_string();
        }
        self.pages.iter().map(|page| page.text.as_str()).collect()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.url.as_str()).collect()
    }

    pub fn timed_out(&self) -> usize {
        self.pages.iter().filter(|page| page.timed_out).count()
    }
}

/// Search a library's documentation site and return the text of the top hits.
#[derive(Clone)]
pub struct DocsLookup {
    catalog: LibraryCatalog,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    result_count: usize,
    fetch_concurrency: usize,
}

impl DocsLookup {
    pub fn new(
        catalog: LibraryCatalog,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            catalog,
            search,
            fetcher,
            result_count: DEFAULT_RESULT_COUNT,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Serper search and plain HTTP fetches over the default catalog.
    pub fn from_config(config: &LookupConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let search = SerperClient::with_endpoint(
            config.api_key.clone(),
            config.search_endpoint.clone(),
            &config.search_client_config(),
        )?;
        let fetcher = HttpPageFetcher::new(&config.fetch_client_config())?;
        Ok(Self::new(LibraryCatalog::default(), Arc::new(search), Arc::new(fetcher))
            .with_result_count(config.result_count)
            .with_fetch_concurrency(config.fetch_concurrency))
    }

    #[must_use]
    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count.max(1);
        self
    }

    /// `1` fetches pages strictly one after another.
    #[must_use]
    pub fn with_fetch_concurrency(mut self, limit: usize) -> Self {
        self.fetch_concurrency = limit.max(1);
        self
    }

    pub fn catalog(&self) -> &LibraryCatalog {
        &self.catalog
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    pub async fn get_docs(&self, query: &str, library: &str) -> Result<String, LookupError> {
        Ok(self.lookup(query, library).await?.text())
    }

    #[instrument(name = "docs_lookup_core.lookup", skip(self))]
    pub async fn lookup(&self, query: &str, library: &str) -> Result<LookupReport, LookupError> {
        let scoped_query = self.catalog.scoped_query(query, library)?;
        let request = SearchRequest::new(scoped_query.clone(), self.result_count);

        let results = self
            .search
            .search(&request)
            .await
            .map_err(LookupError::SearchProvider)?;

        if results.is_empty() {
            info!(target: "docs_lookup_core", %scoped_query, "search returned no results");
            return Ok(LookupReport {
                library: library.to_string(),
                scoped_query,
                pages: Vec::new(),
            });
        }

        debug!(
            target: "docs_lookup_core",
            results = results.len(),
            concurrency = self.fetch_concurrency,
            "fetching result pages"
        );

        // `buffered` yields in input order regardless of completion order.
        let pages: Vec<PageText> = stream::iter(results)
            .map(|result| async move {
                let page = self
                    .fetcher
                    .fetch_text(&result.link)
                    .await
                    .map_err(|source| LookupError::Fetch {
                        url: result.link.clone(),
                        source,
                    })?;
                Ok::<_, LookupError>(PageText {
                    url: result.link,
                    title: result.title,
                    text: page.text,
                    timed_out: page.timed_out,
                })
            })
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        let report = LookupReport {
            library: library.to_string(),
            scoped_query,
            pages,
        };
        info!(
            target: "docs_lookup_core",
            library,
            pages = report.pages.len(),
            timed_out = report.timed_out(),
            "lookup completed"
        );
        Ok(report)
    }
}
