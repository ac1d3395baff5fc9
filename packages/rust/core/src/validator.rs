//! Validator stage: fixed rule set over the accumulated profile.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use prospector_shared::CompanyProfile;

/// Accepted X/Twitter profile URL shape.
static TWITTER_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?(twitter\.com|x\.com)/.+").expect("valid twitter URL regex")
});

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub defects: Vec<String>,
}

/// Validate a profile against the fixed rule set.
///
/// Pure function of the profile: every rule runs (no short-circuiting)
/// and may contribute a defect. The caller owns the retry counter and
/// decides what to do with the verdict.
#[instrument(skip_all, fields(company = %profile.name))]
pub fn validate(profile: &CompanyProfile) -> ValidationReport {
    let mut defects = Vec::new();

    if profile.domain.as_deref().is_none_or(str::is_empty) {
        defects.push("Missing Company Domain".to_string());
    }

    if profile.founders.is_empty() {
        defects.push("No Founders Identified".to_string());
    }

    if let Some(url) = non_empty(&profile.twitter_url) {
        if !TWITTER_URL_RE.is_match(url) {
            defects.push(format!("Invalid Company Twitter URL: {url}"));
        }
    }

    // Intentionally loose heuristic carried over from the source tool:
    // a value passes if it contains a digit or is longer than one
    // character. Flagged as likely defective; kept as observed behavior.
    if let Some(staff) = non_empty(&profile.staff_strength) {
        if !(staff.chars().any(|c| c.is_ascii_digit()) || staff.chars().count() > 1) {
            defects.push(format!("Suspicious Staff Strength: {staff}"));
        }
    }

    for founder in &profile.founders {
        if let Some(url) = non_empty(&founder.twitter_url) {
            if !TWITTER_URL_RE.is_match(url) {
                defects.push(format!(
                    "Invalid Founder Twitter URL ({}): {url}",
                    founder.name
                ));
            }
        }
    }

    let is_valid = defects.is_empty();
    debug!(is_valid, defects = defects.len(), "validation complete");

    ValidationReport { is_valid, defects }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
