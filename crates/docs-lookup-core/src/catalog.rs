use std::collections::BTreeMap;

use crate::error::LookupError;

/// Supported libraries and the documentation site each one is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCatalog {
    sites: BTreeMap<String, String>,
}

impl Default for LibraryCatalog {
    fn default() -> Self {
        Self::new([
            ("langchain", "python.langchain.com/docs"),
            ("llama-index", "docs.llamaindex.ai/en/stable"),
            ("openai", "platform.openai.com/docs"),
        ])
    }
}

impl LibraryCatalog {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sites: entries
                .into_iter()
                .map(|(library, site)| (library.into(), site.into()))
                .collect(),
        }
    }

    pub fn scope(&self, library: &str) -> Option<&str> {
        self.sites.get(library).map(String::as_str)
    }

    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sites
            .iter()
            .map(|(library, site)| (library.as_str(), site.as_str()))
    }

    /// Build `site:<scope> <query>` for `library`.
    pub fn scoped_query(&self, query: &str, library: &str) -> Result<String, LookupError> {
        let scope = self
            .scope(library)
            .ok_or_else(|| LookupError::UnsupportedLibrary {
                library: library.to_string(),
                supported: self.libraries().map(str::to_string).collect(),
            })?;
        Ok(format!("site:{scope} {query}"))
    }
}
