//! Flattening finished runs into tabular rows, plus CSV row I/O.

use std::path::Path;

use tracing::{info, warn};

use prospector_shared::{FounderRecord, InputRow, OutputRow, ProspectorError, Result, RunState};

/// Separator between founders inside a joined column.
const JOIN: &str = "; ";

/// Flatten a finished run into its output row.
///
/// Founder names always appear; the contact columns include only the
/// founders that have the value, matching the source tool's sheets.
pub fn flatten(state: &RunState) -> OutputRow {
    let profile = &state.profile;
    let founders = &profile.founders;

    OutputRow {
        company: profile.name.clone(),
        domain: profile.domain.clone().unwrap_or_default(),
        description: profile.description.clone().unwrap_or_default(),
        staff_strength: profile.staff_strength.clone().unwrap_or_default(),
        company_linkedin: profile.reference_id.clone().unwrap_or_default(),
        company_twitter: profile.twitter_url.clone().unwrap_or_default(),
        company_phone: profile.phone.clone().unwrap_or_default(),
        founder_names: founders
            .iter()
            .map(|f| f.name.clone())
            .collect::<Vec<_>>()
            .join(JOIN),
        founder_emails: join_present(founders, |f| f.email.as_deref()),
        founder_phones: join_present(founders, |f| f.phone.as_deref()),
        founder_linkedins: join_present(founders, |f| f.linkedin_url.as_deref()),
        founder_twitters: join_present(founders, |f| f.twitter_url.as_deref()),
        errors: state.defects.join(JOIN),
    }
}

/// Join one optional attribute across founders, skipping absent/empty values.
fn join_present<'a, F>(founders: &'a [FounderRecord], attr: F) -> String
where
    F: Fn(&'a FounderRecord) -> Option<&'a str>,
{
    founders
        .iter()
        .filter_map(attr)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(JOIN)
}

/// Read input rows from a CSV file. Unreadable rows are skipped with a
/// warning rather than failing the batch.
pub fn read_input_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        ProspectorError::Csv(format!("cannot read '{}': {e}", path.display()))
    })?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<InputRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => warn!(row = i + 1, error = %e, "skipping unreadable input row"),
        }
    }
    Ok(rows)
}

/// Write the enriched dataset to the output CSV.
pub fn write_output_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        ProspectorError::Csv(format!("cannot write '{}': {e}", path.display()))
    })?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| ProspectorError::io(path, e))?;

    info!(rows = rows.len(), path = %path.display(), "output written");
    Ok(())
}
