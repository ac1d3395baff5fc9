//! External provider capabilities for Prospector.
//!
//! The research pipeline depends on two injected capabilities: a web
//! search provider and a text extraction provider. Both are traits so the
//! pipeline can be driven by deterministic fakes in tests; the production
//! implementations ([`TavilySearch`], [`OpenRouterExtractor`]) are thin
//! HTTP clients.

mod extraction;
mod search;

use std::future::Future;

use prospector_shared::Result;

pub use extraction::OpenRouterExtractor;
pub use search::TavilySearch;

/// One ranked result from a web search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Outcome of one search query.
///
/// Search never fails hard: provider errors surface as an empty result
/// set plus the error marker, so callers can always proceed to extraction
/// with possibly-empty context.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// An empty response carrying a provider error marker.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Issues keyword queries against a web-search capability.
pub trait SearchProvider {
    /// Run one query and return ranked snippets.
    fn search(&self, query: &str) -> impl Future<Output = SearchResponse> + Send;
}

/// Given a natural-language instruction plus supporting text, returns a
/// best-effort structured response (free-form text that should contain
/// JSON, possibly wrapped in prose or code fences).
pub trait ExtractionProvider {
    /// Run one extraction call. May fail on transport errors; callers
    /// wrap this and degrade to a no-op.
    fn complete(
        &self,
        instruction: &str,
        context: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}
