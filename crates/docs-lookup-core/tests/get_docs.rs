use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use docs_lookup_client::{
    ApiKey, ClientConfig, ClientError, FetchedPage, OrganicResult, PageFetcher, SearchProvider,
    SearchRequest, SerperClient, StatusCode,
};
use docs_lookup_core::{
    state::AppContext, tools::tool_entries, DocsLookup, LibraryCatalog, LookupError, NO_RESULTS,
};
use serde_json::json;

#[derive(Default)]
struct StubSearch {
    links: Vec<&'static str>,
    fail: bool,
    requests: Mutex<Vec<SearchRequest>>,
}

impl StubSearch {
    fn returning(links: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            links: links.to_vec(),
            ..Self::default()
        })
    }

    fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<OrganicResult>, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ClientError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(self
            .links
            .iter()
            .take(request.num)
            .map(|link| OrganicResult {
                link: (*link).to_string(),
                title: None,
                snippet: None,
                position: None,
            })
            .collect())
    }
}

enum StubPage {
    Text(&'static str),
    Delayed(&'static str, Duration),
    TimedOut,
    Unreachable,
}

#[derive(Default)]
struct StubFetcher {
    pages: HashMap<&'static str, StubPage>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with(pages: impl IntoIterator<Item = (&'static str, StubPage)>) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.into_iter().collect(),
            fetched: Mutex::default(),
        })
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<FetchedPage, ClientError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(StubPage::Text(text)) => Ok(FetchedPage::new(*text)),
            Some(StubPage::Delayed(text, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(FetchedPage::new(*text))
            }
            Some(StubPage::TimedOut) => Ok(FetchedPage::timed_out()),
            Some(StubPage::Unreachable) | None => {
                Err(ClientError::Http(format!("connection refused: {url}")))
            }
        }
    }
}

fn lookup(search: &Arc<StubSearch>, fetcher: &Arc<StubFetcher>) -> DocsLookup {
    DocsLookup::new(LibraryCatalog::default(), search.clone(), fetcher.clone())
}

const PAGE_A: &str = "https://python.langchain.com/docs/a";
const PAGE_B: &str = "https://python.langchain.com/docs/b";

#[tokio::test]
async fn concatenates_pages_in_result_order() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Text("Hello ")),
        (PAGE_B, StubPage::Text("World")),
    ]);

    let text = lookup(&search, &fetcher)
        .get_docs("vector store", "langchain")
        .await
        .expect("lookup succeeds");

    assert_eq!(text, "Hello World");
    assert_eq!(
        search.requests(),
        [SearchRequest::new("site:python.langchain.com/docs vector store", 2)]
    );
    assert_eq!(fetcher.fetched(), [PAGE_A, PAGE_B]);
}

#[tokio::test]
async fn unsupported_library_makes_no_calls() {
    let search = StubSearch::returning(&[PAGE_A]);
    let fetcher = StubFetcher::with([(PAGE_A, StubPage::Text("never"))]);

    let error = lookup(&search, &fetcher)
        .get_docs("anything", "unknown-lib")
        .await
        .expect_err("unknown library fails");

    assert!(
        matches!(&error, LookupError::UnsupportedLibrary { library, .. } if library == "unknown-lib")
    );
    assert!(search.requests().is_empty());
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn every_catalog_entry_scopes_the_search() {
    let search = StubSearch::returning(&[]);
    let fetcher = Arc::new(StubFetcher::default());
    let lookup = lookup(&search, &fetcher);

    for library in ["langchain", "llama-index", "openai"] {
        lookup.get_docs("streaming", library).await.expect("lookup");
    }

    let queries: Vec<_> = search.requests().into_iter().map(|r| r.query).collect();
    assert_eq!(
        queries,
        [
            "site:python.langchain.com/docs streaming",
            "site:docs.llamaindex.ai/en/stable streaming",
            "site:platform.openai.com/docs streaming",
        ]
    );
}

#[tokio::test]
async fn no_results_skips_fetching() {
    let search = StubSearch::returning(&[]);
    let fetcher = Arc::new(StubFetcher::default());

    let text = lookup(&search, &fetcher)
        .get_docs("vector store", "langchain")
        .await
        .expect("lookup succeeds");

    assert_eq!(text, NO_RESULTS);
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn fetch_timeout_contributes_placeholder() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::TimedOut),
        (PAGE_B, StubPage::Text("World")),
    ]);

    let report = lookup(&search, &fetcher)
        .lookup("vector store", "langchain")
        .await
        .expect("lookup succeeds");

    assert_eq!(report.text(), "Timeout errorWorld");
    assert_eq!(report.timed_out(), 1);
    assert!(report.pages[0].timed_out);
}

#[tokio::test]
async fn concurrent_fetches_keep_result_order() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Delayed("first ", Duration::from_millis(100))),
        (PAGE_B, StubPage::Text("second")),
    ]);

    let text = lookup(&search, &fetcher)
        .with_fetch_concurrency(2)
        .get_docs("vector store", "langchain")
        .await
        .expect("lookup succeeds");

    assert_eq!(text, "first second");
}

#[tokio::test]
async fn sequential_fetches_run_in_order() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Delayed("first ", Duration::from_millis(20))),
        (PAGE_B, StubPage::Text("second")),
    ]);

    let text = lookup(&search, &fetcher)
        .with_fetch_concurrency(1)
        .get_docs("vector store", "langchain")
        .await
        .expect("lookup succeeds");

    assert_eq!(text, "first second");
    assert_eq!(fetcher.fetched(), [PAGE_A, PAGE_B]);
}

#[tokio::test]
async fn repeated_invocations_are_identical() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Text("alpha")),
        (PAGE_B, StubPage::Text("beta")),
    ]);
    let lookup = lookup(&search, &fetcher);

    let first = lookup.get_docs("q", "langchain").await.expect("first");
    let second = lookup.get_docs("q", "langchain").await.expect("second");
    assert_eq!(first, second);
    assert_eq!(search.requests().len(), 2);
}

#[tokio::test]
async fn search_failure_is_a_provider_error() {
    let search = Arc::new(StubSearch {
        fail: true,
        ..StubSearch::default()
    });
    let fetcher = Arc::new(StubFetcher::default());

    let error = lookup(&search, &fetcher)
        .get_docs("q", "openai")
        .await
        .expect_err("provider failure propagates");

    assert!(matches!(error, LookupError::SearchProvider(ClientError::Status(_))));
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn fetch_failure_names_the_url() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Text("fine")),
        (PAGE_B, StubPage::Unreachable),
    ]);

    let error = lookup(&search, &fetcher)
        .get_docs("q", "langchain")
        .await
        .expect_err("transport failure propagates");

    assert!(matches!(&error, LookupError::Fetch { url, .. } if url == PAGE_B));
}

#[tokio::test]
async fn search_timeout_reads_as_no_results() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(json!({"organic": [{"link": PAGE_A}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let search = SerperClient::with_endpoint(
        ApiKey::new("test-key"),
        format!("{}/search", server.uri()),
        &ClientConfig::default().with_timeout(Duration::from_millis(100)),
    )
    .expect("client builds");
    let fetcher = StubFetcher::with([(PAGE_A, StubPage::Text("never"))]);

    let text = DocsLookup::new(LibraryCatalog::default(), Arc::new(search), fetcher.clone())
        .get_docs("vector store", "langchain")
        .await
        .expect("timeout is not an error");

    assert_eq!(text, "No results found");
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn tool_handler_returns_text_and_sources() {
    let search = StubSearch::returning(&[PAGE_A, PAGE_B]);
    let fetcher = StubFetcher::with([
        (PAGE_A, StubPage::Text("Hello ")),
        (PAGE_B, StubPage::Text("World")),
    ]);
    let context = Arc::new(AppContext::new(lookup(&search, &fetcher)));
    let entry = tool_entries(&context).remove(0);

    let response = (entry.handler)(
        context.clone(),
        json!({"query": "vector store", "library": "langchain"}),
    )
    .await
    .expect("tool succeeds");

    assert_eq!(response.content.len(), 1);
    assert_eq!(response.content[0].r#type, "text");
    assert_eq!(response.content[0].text, "Hello World");
    let metadata = response.metadata.expect("metadata");
    assert_eq!(metadata["sources"], json!([PAGE_A, PAGE_B]));
    assert_eq!(
        metadata["scopedQuery"],
        "site:python.langchain.com/docs vector store"
    );
}

#[tokio::test]
async fn tool_handler_rejects_bad_arguments() {
    let search = StubSearch::returning(&[]);
    let fetcher = Arc::new(StubFetcher::default());
    let context = Arc::new(AppContext::new(lookup(&search, &fetcher)));
    let entry = tool_entries(&context).remove(0);

    let error = (entry.handler)(context.clone(), json!({"query": "missing library"}))
        .await
        .expect_err("library is required");
    assert!(error.to_string().contains("invalid arguments"));

    let error = (entry.handler)(
        context.clone(),
        json!({"query": "q", "library": "unknown-lib"}),
    )
    .await
    .expect_err("unknown library fails");
    assert!(error.to_string().contains("unknown-lib"));
    assert!(search.requests().is_empty());
}
