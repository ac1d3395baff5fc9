//! Deterministic provider fakes for stage and controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use prospector_providers::{
    ExtractionProvider, SearchHit, SearchProvider, SearchResponse,
};
use prospector_shared::{ProspectorError, Result};

/// Search fake that returns one canned hit per query and records every
/// query it was asked.
#[derive(Default)]
pub struct FakeSearch {
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str) -> SearchResponse {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_string());
        SearchResponse {
            results: vec![SearchHit {
                title: "result".into(),
                url: "https://example.com".into(),
                snippet: format!("snippet for: {query}"),
            }],
            error: None,
        }
    }
}

/// Extraction fake that replays a script of responses in order.
///
/// `Err(message)` entries simulate transport failures. Running past the
/// end of the script panics, which catches tests that issue more
/// extraction calls than they expect.
pub struct ScriptedExtractor {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
}

impl ScriptedExtractor {
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn ok_once(response: &str) -> Self {
        Self::new(vec![Ok(response.to_string())])
    }

    pub fn err_once(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }
}

impl ExtractionProvider for ScriptedExtractor {
    async fn complete(&self, _instruction: &str, _context: &str) -> Result<String> {
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .expect("scripted extractor ran out of responses")
            .map_err(ProspectorError::Extraction)
    }
}
