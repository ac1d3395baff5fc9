//! Core domain types for Prospector research runs.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for research run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// FounderRecord
// ---------------------------------------------------------------------------

/// One discovered person associated with a company.
///
/// `name` is the identity key within a run. Fields are only added or
/// overwritten across passes, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FounderRecord {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl FounderRecord {
    /// Merge one enrichment extraction into this record.
    ///
    /// Overwrite-if-present semantics: a key the extraction returned
    /// (even as `null`) replaces the current value; an absent key leaves
    /// the current value untouched.
    pub fn apply_enrichment(&mut self, extract: FounderExtract) {
        if let Some(v) = extract.twitter_url {
            self.twitter_url = v;
        }
        if let Some(v) = extract.email {
            self.email = v;
        }
        if let Some(v) = extract.phone {
            self.phone = v;
        }
        if let Some(v) = extract.linkedin_url {
            self.linkedin_url = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction shapes
// ---------------------------------------------------------------------------

/// Founder entry as emitted by the research extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFounder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

impl From<ExtractedFounder> for FounderRecord {
    fn from(e: ExtractedFounder) -> Self {
        Self {
            name: e.name,
            title: e.title,
            linkedin_url: e.linkedin_url,
            twitter_url: None,
            email: None,
            phone: None,
        }
    }
}

/// The JSON object the research extraction call is instructed to emit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchExtract {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub staff_strength: Option<String>,
    #[serde(default)]
    pub founders: Vec<ExtractedFounder>,
}

/// The JSON object the per-founder enrichment extraction is instructed
/// to emit.
///
/// Double-`Option` fields distinguish "key absent" (outer `None`, leave
/// the record alone) from "key present but null" (inner `None`, clear
/// the field).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FounderExtract {
    #[serde(default, deserialize_with = "some_if_present")]
    pub twitter_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "some_if_present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "some_if_present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "some_if_present")]
    pub linkedin_url: Option<Option<String>>,
}

/// Wrap any present value (including `null`) in `Some`; absent keys fall
/// back to the field's `#[serde(default)]` of `None`.
fn some_if_present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// CompanyProfile
// ---------------------------------------------------------------------------

/// The aggregate research result for one input company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Input company name, immutable.
    pub name: String,
    /// Opaque external identifier from the input row, carried through
    /// unchanged (a LinkedIn company URL in the source sheets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Headcount or range, e.g. "50-200".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_strength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Ordered, unique by name within the sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub founders: Vec<FounderRecord>,
}

impl CompanyProfile {
    /// Create an empty profile with only the input fields populated.
    pub fn new(name: impl Into<String>, reference_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            reference_id,
            domain: None,
            description: None,
            staff_strength: None,
            twitter_url: None,
            phone: None,
            founders: Vec::new(),
        }
    }

    /// Merge one research extraction into the profile.
    ///
    /// Company-level scalars are overwritten unconditionally, including to
    /// `None` — a later pass may erase a previously found value. The
    /// founder list is wholesale-replaced only when the extraction yielded
    /// at least one founder; an empty list preserves a prior pass's
    /// findings.
    pub fn apply_research(&mut self, extract: ResearchExtract) {
        self.domain = extract.domain;
        self.description = extract.description;
        self.twitter_url = extract.twitter_url;
        self.phone = extract.phone;
        self.staff_strength = extract.staff_strength;

        let incoming = dedupe_founders(extract.founders);
        if !incoming.is_empty() {
            self.founders = incoming;
        }
    }
}

/// Drop nameless entries and keep the first occurrence per name,
/// preserving order.
fn dedupe_founders(extracted: Vec<ExtractedFounder>) -> Vec<FounderRecord> {
    let mut seen = std::collections::HashSet::new();
    extracted
        .into_iter()
        .filter(|f| !f.name.trim().is_empty())
        .filter(|f| seen.insert(f.name.clone()))
        .map(FounderRecord::from)
        .collect()
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// The pipeline controller's working memory for one company.
///
/// Created once per input row and discarded after the controller reaches
/// its terminal state; never shared across companies.
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: RunId,
    pub profile: CompanyProfile,
    /// Number of validator evaluations so far. Owned and incremented by
    /// the controller, never by the validator.
    pub retry_count: u32,
    /// Set only by validation; meaningless before the first validator run.
    pub is_valid: bool,
    /// Fully overwritten on each validator run, never accumulated.
    pub defects: Vec<String>,
    /// Append-only observability trail; never consulted for control flow.
    pub log: Vec<String>,
}

impl RunState {
    /// Create a fresh run for one company.
    pub fn new(company_name: impl Into<String>, reference_id: Option<String>) -> Self {
        Self {
            run_id: RunId::new(),
            profile: CompanyProfile::new(company_name, reference_id),
            retry_count: 0,
            is_valid: false,
            defects: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Append a line to the observability log.
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

// ---------------------------------------------------------------------------
// Input / output rows
// ---------------------------------------------------------------------------

/// One unit of work from the input CSV.
///
/// Header aliases match the source sheets (`Company Name`, `LinkedIn URL`)
/// as well as their snake_case forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRow {
    #[serde(alias = "Company Name", alias = "name", default)]
    pub company_name: Option<String>,
    #[serde(alias = "LinkedIn URL", alias = "linkedin_url", default)]
    pub reference_id: Option<String>,
}

/// Flattened profile written to the output CSV after a run completes.
///
/// Founder columns join one string per founder with `"; "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Input Company")]
    pub company: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Staff Strength")]
    pub staff_strength: String,
    #[serde(rename = "Company LinkedIn")]
    pub company_linkedin: String,
    #[serde(rename = "Company Twitter")]
    pub company_twitter: String,
    #[serde(rename = "Company Phone")]
    pub company_phone: String,
    #[serde(rename = "Founder Names")]
    pub founder_names: String,
    #[serde(rename = "Founder Emails")]
    pub founder_emails: String,
    #[serde(rename = "Founder Phones")]
    pub founder_phones: String,
    #[serde(rename = "Founder LinkedIns")]
    pub founder_linkedins: String,
    #[serde(rename = "Founder Twitters")]
    pub founder_twitters: String,
    #[serde(rename = "Errors")]
    pub errors: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_with(domain: Option<&str>, founders: Vec<ExtractedFounder>) -> ResearchExtract {
        ResearchExtract {
            domain: domain.map(String::from),
            founders,
            ..Default::default()
        }
    }

    fn founder(name: &str) -> ExtractedFounder {
        ExtractedFounder {
            name: name.into(),
            title: "CEO".into(),
            linkedin_url: None,
        }
    }

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn research_merge_replaces_founders_when_non_empty() {
        let mut profile = CompanyProfile::new("Acme", None);
        profile.apply_research(extract_with(Some("acme.com"), vec![founder("Jane Doe")]));
        assert_eq!(profile.founders.len(), 1);

        profile.apply_research(extract_with(Some("acme.io"), vec![founder("John Roe")]));
        assert_eq!(profile.founders.len(), 1);
        assert_eq!(profile.founders[0].name, "John Roe");
    }

    #[test]
    fn research_merge_preserves_founders_on_empty_extraction() {
        let mut profile = CompanyProfile::new("Acme", None);
        profile.apply_research(extract_with(Some("acme.com"), vec![founder("Jane Doe")]));

        let before = profile.founders.clone();
        profile.apply_research(extract_with(None, vec![]));
        assert_eq!(profile.founders, before);
        // Scalars are replaced even when the new pass found nothing.
        assert_eq!(profile.domain, None);
    }

    #[test]
    fn research_merge_erases_scalars_with_null() {
        let mut profile = CompanyProfile::new("Acme", None);
        profile.twitter_url = Some("https://x.com/acme".into());
        profile.apply_research(ResearchExtract::default());
        assert_eq!(profile.twitter_url, None);
    }

    #[test]
    fn research_merge_dedupes_founders_by_name() {
        let mut profile = CompanyProfile::new("Acme", None);
        profile.apply_research(extract_with(
            None,
            vec![founder("Jane Doe"), founder("Jane Doe"), founder("")],
        ));
        assert_eq!(profile.founders.len(), 1);
        assert_eq!(profile.founders[0].name, "Jane Doe");
    }

    #[test]
    fn enrichment_merge_overwrites_present_keys_only() {
        let mut record = FounderRecord {
            name: "Jane Doe".into(),
            title: "CEO".into(),
            linkedin_url: Some("https://linkedin.com/in/janedoe".into()),
            twitter_url: Some("https://x.com/janedoe".into()),
            email: None,
            phone: None,
        };

        // email present, twitter_url present-but-null, the rest absent.
        let extract: FounderExtract =
            serde_json::from_str(r#"{"email": "jane@acme.com", "twitter_url": null}"#)
                .expect("deserialize");
        record.apply_enrichment(extract);

        assert_eq!(record.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(record.twitter_url, None);
        assert_eq!(
            record.linkedin_url.as_deref(),
            Some("https://linkedin.com/in/janedoe")
        );
    }

    #[test]
    fn founder_extract_distinguishes_absent_from_null() {
        let extract: FounderExtract =
            serde_json::from_str(r#"{"phone": null}"#).expect("deserialize");
        assert_eq!(extract.phone, Some(None));
        assert_eq!(extract.email, None);
    }

    #[test]
    fn input_row_accepts_sheet_headers() {
        let mut reader = csv::Reader::from_reader(
            "Company Name,LinkedIn URL\nAcme Corp,https://linkedin.com/company/acme\n".as_bytes(),
        );
        let row: InputRow = reader
            .deserialize()
            .next()
            .expect("one row")
            .expect("deserialize");
        assert_eq!(row.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(
            row.reference_id.as_deref(),
            Some("https://linkedin.com/company/acme")
        );
    }

    #[test]
    fn input_row_accepts_snake_case_headers() {
        let mut reader =
            csv::Reader::from_reader("name,linkedin_url\nAcme Corp,\n".as_bytes());
        let row: InputRow = reader
            .deserialize()
            .next()
            .expect("one row")
            .expect("deserialize");
        assert_eq!(row.company_name.as_deref(), Some("Acme Corp"));
        // The csv deserializer maps an empty field to None for Option fields.
        assert_eq!(row.reference_id, None);
    }

    #[test]
    fn output_row_header_names() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(OutputRow::default()).expect("serialize");
        let data = String::from_utf8(writer.into_inner().expect("flush")).expect("utf8");
        let header = data.lines().next().expect("header line");
        assert!(header.starts_with("Input Company,Domain,Description"));
        assert!(header.ends_with("Founder Twitters,Errors"));
    }
}
