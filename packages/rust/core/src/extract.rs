//! Tolerant JSON payload extraction from model output.
//!
//! Extraction responses frequently wrap the JSON object in markdown code
//! fences or surrounding prose. This module strips the wrapping and
//! parses only the payload.

use serde::de::DeserializeOwned;

use prospector_shared::{ProspectorError, Result};

/// Locate and deserialize the JSON object inside a raw extraction response.
///
/// Handles, in order: ```json fences, bare ``` fences, and a JSON object
/// embedded in leading/trailing prose (outermost `{...}` span).
pub fn parse_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let payload = locate_payload(raw)
        .ok_or_else(|| ProspectorError::parse(format!("no JSON object in: {}", preview(raw))))?;

    serde_json::from_str(payload)
        .map_err(|e| ProspectorError::parse(format!("{e} in: {}", preview(payload))))
}

/// Find the JSON payload slice within the raw response, if any.
fn locate_payload(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    if let Some(fenced) = between(trimmed, "```json", "```") {
        return Some(fenced.trim());
    }
    if let Some(fenced) = between(trimmed, "```", "```") {
        return Some(fenced.trim());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// The slice between the first `open` marker and the next `close` marker.
fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let after = &s[s.find(open)? + open.len()..];
    Some(&after[..after.find(close)?])
}

/// Truncated copy of the raw text for error messages.
fn preview(s: &str) -> String {
    const MAX: usize = 120;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}…")
    }
}
