//! Enricher stage: per-founder contact and social details.

use tracing::{info, instrument, warn};

use prospector_providers::{ExtractionProvider, SearchProvider};
use prospector_shared::{FounderExtract, RunState};

use crate::extract::parse_json_payload;
use crate::pipeline::ProgressReporter;

/// Instruction template for the per-founder extraction call.
fn enrich_instruction(founder_name: &str, company_name: &str) -> String {
    format!(
        "Extract contact info for founder '{founder_name}' of '{company_name}' \
         from the results below.\n\
         \n\
         Output JSON:\n\
         {{\n\
           \"twitter_url\": \"string or null (prioritize x.com or twitter.com)\",\n\
           \"email\": \"string or null\",\n\
           \"phone\": \"string or null\",\n\
           \"linkedin_url\": \"string or null (if better match found)\"\n\
         }}"
    )
}

/// Run the enricher stage for one company.
///
/// Founders are processed one at a time, in order. A failed extraction
/// for one founder leaves that record exactly as it was and never aborts
/// the batch. The stage has no retry of its own; re-running the whole set
/// happens only via the controller loop.
#[instrument(skip_all, fields(run_id = %state.run_id, company = %state.profile.name))]
pub async fn run<S, E>(
    search: &S,
    extractor: &E,
    state: &mut RunState,
    progress: &dyn ProgressReporter,
) where
    S: SearchProvider,
    E: ExtractionProvider,
{
    if state.profile.founders.is_empty() {
        info!("no founders to enrich");
        state.push_log("No founders to enrich.".to_string());
        return;
    }

    let company = state.profile.name.clone();
    let total = state.profile.founders.len();
    info!(founders = total, "enriching founders");

    // Disjoint borrows: records are mutated in place while diagnostics
    // append to the run log.
    let founders = &mut state.profile.founders;
    let log = &mut state.log;

    for (i, founder) in founders.iter_mut().enumerate() {
        progress.founder(&founder.name, i + 1, total);

        let contact_results = search
            .search(&format!(
                "{} {company} email twitter linkedin contact",
                founder.name
            ))
            .await;
        let twitter_results = search
            .search(&format!(
                "site:twitter.com {0} {company} OR site:x.com {0} {company}",
                founder.name
            ))
            .await;

        let context = format!(
            "Results: {}\nTwitter Results: {}",
            serde_json::to_string(&contact_results.results).unwrap_or_else(|_| "[]".into()),
            serde_json::to_string(&twitter_results.results).unwrap_or_else(|_| "[]".into()),
        );

        let raw = match extractor
            .complete(&enrich_instruction(&founder.name, &company), &context)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(founder = %founder.name, error = %e, "enrichment failed, keeping record as-is");
                log.push(format!("Enricher error ({}): {e}", founder.name));
                continue;
            }
        };

        match parse_json_payload::<FounderExtract>(&raw) {
            Ok(extracted) => founder.apply_enrichment(extracted),
            Err(e) => {
                warn!(founder = %founder.name, error = %e, "enrichment output unparseable, keeping record as-is");
                log.push(format!("Enricher error ({}): {e}", founder.name));
            }
        }
    }

    state.push_log(format!("Enriched {total} founders."));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::testutil::{FakeSearch, ScriptedExtractor};
    use prospector_shared::FounderRecord;

    fn state_with_founders(names: &[&str]) -> RunState {
        let mut state = RunState::new("Acme Corp", None);
        state.profile.founders = names
            .iter()
            .map(|name| FounderRecord {
                name: (*name).to_string(),
                title: "Co-Founder".into(),
                linkedin_url: None,
                twitter_url: None,
                email: None,
                phone: None,
            })
            .collect();
        state
    }

    #[tokio::test]
    async fn no_founders_is_a_logged_no_op() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::empty();

        let mut state = RunState::new("Acme Corp", None);
        run(&search, &extractor, &mut state, &SilentProgress).await;

        assert!(search.queries().is_empty());
        assert!(state.log.iter().any(|l| l.contains("No founders to enrich")));
    }

    #[tokio::test]
    async fn merges_contact_details_per_founder() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::new(vec![
            Ok(r#"{"email": "jane@acme.com", "twitter_url": "https://x.com/janedoe"}"#.into()),
        ]);

        let mut state = state_with_founders(&["Jane Doe"]);
        run(&search, &extractor, &mut state, &SilentProgress).await;

        let founder = &state.profile.founders[0];
        assert_eq!(founder.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(founder.twitter_url.as_deref(), Some("https://x.com/janedoe"));
        // Two searches per founder: contact discovery + targeted handle.
        assert_eq!(search.queries().len(), 2);
    }

    #[tokio::test]
    async fn one_failure_never_aborts_the_batch() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::new(vec![
            Ok(r#"{"email": "ann@acme.com"}"#.into()),
            Err("timeout".into()),
            Ok(r#"{"email": "cho@acme.com"}"#.into()),
        ]);

        let mut state = state_with_founders(&["Ann", "Bob", "Cho"]);
        let before_bob = state.profile.founders[1].clone();
        run(&search, &extractor, &mut state, &SilentProgress).await;

        assert_eq!(state.profile.founders[0].email.as_deref(), Some("ann@acme.com"));
        assert_eq!(state.profile.founders[1], before_bob);
        assert_eq!(state.profile.founders[2].email.as_deref(), Some("cho@acme.com"));
        assert!(state.log.iter().any(|l| l.contains("Enricher error (Bob)")));
    }

    #[tokio::test]
    async fn unparseable_output_keeps_record_untouched() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::ok_once("no json here");

        let mut state = state_with_founders(&["Jane Doe"]);
        let before = state.profile.founders[0].clone();
        run(&search, &extractor, &mut state, &SilentProgress).await;

        assert_eq!(state.profile.founders[0], before);
    }
}
