//! Tavily-backed implementation of [`SearchProvider`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use prospector_shared::config::SearchConfig;
use prospector_shared::{ProspectorError, Result};

use crate::{SearchHit, SearchProvider, SearchResponse};

/// Default Tavily search endpoint.
const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("Prospector/", env!("CARGO_PKG_VERSION"));

/// Web search client for the Tavily API.
pub struct TavilySearch {
    client: Client,
    endpoint: String,
    api_key: String,
    search_depth: String,
    max_results: u32,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    /// Create a new search client from config plus a resolved API key.
    pub fn new(api_key: String, config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProspectorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key,
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
        })
    }

    /// Point the client at a different endpoint (integration tests with
    /// mock servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search_inner(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: &self.search_depth,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProspectorError::Network(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProspectorError::Network(format!("search: HTTP {status}")));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ProspectorError::Network(format!("search response body: {e}")))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }
}

impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> SearchResponse {
        match self.search_inner(query).await {
            Ok(results) => {
                debug!(query, hits = results.len(), "search complete");
                SearchResponse {
                    results,
                    error: None,
                }
            }
            Err(e) => {
                warn!(query, error = %e, "search failed, proceeding with empty results");
                SearchResponse::failed(e.to_string())
            }
        }
    }
}
