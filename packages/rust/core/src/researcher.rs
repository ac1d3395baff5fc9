//! Researcher stage: broad company facts and a first-pass founder list.

use tracing::{info, instrument, warn};

use prospector_providers::{ExtractionProvider, SearchProvider, SearchResponse};
use prospector_shared::{ResearchExtract, RunState};

use crate::extract::parse_json_payload;

/// Instruction template for the research extraction call.
fn research_instruction(company_name: &str) -> String {
    format!(
        "You are a researcher. Extract the following information about the \
         company '{company_name}' from the search results below.\n\
         \n\
         Output JSON format:\n\
         {{\n\
           \"domain\": \"string (website url) or null\",\n\
           \"description\": \"string (brief summary) or null\",\n\
           \"twitter_url\": \"string or null (prioritize x.com or twitter.com profile)\",\n\
           \"phone\": \"string or null (generic corporate number)\",\n\
           \"staff_strength\": \"string (e.g. 10-50) or null\",\n\
           \"founders\": [\n\
             {{\"name\": \"string\", \"title\": \"string (e.g. CEO)\", \"linkedin_url\": \"string or null\"}}\n\
           ]\n\
         }}\n\
         \n\
         If founders are not clearly found, return an empty list for them."
    )
}

/// Serialize one search response block for the extraction context.
fn context_block(label: &str, response: &SearchResponse) -> String {
    let results = serde_json::to_string(&response.results).unwrap_or_else(|_| "[]".into());
    format!("Search Results ({label}): {results}")
}

/// Run the researcher stage for one company.
///
/// Issues four searches (company metadata, founders, X/Twitter handle,
/// phone), then one extraction call over all four result sets. Extraction
/// failures and unparseable output leave the profile untouched: the stage
/// degrades to a logged no-op rather than aborting the run.
#[instrument(skip_all, fields(run_id = %state.run_id, company = %state.profile.name))]
pub async fn run<S, E>(search: &S, extractor: &E, state: &mut RunState)
where
    S: SearchProvider,
    E: ExtractionProvider,
{
    let company = state.profile.name.clone();
    info!("researching company");

    let company_results = search
        .search(&format!("{company} official website twitter staff count"))
        .await;
    let founder_results = search
        .search(&format!("who are the founders of {company} linkedin"))
        .await;
    let twitter_results = search
        .search(&format!(
            "site:twitter.com {company} official profile OR site:x.com {company} official profile"
        ))
        .await;
    let phone_results = search
        .search(&format!(
            "{company} corporate phone number head office contact support"
        ))
        .await;

    let context = [
        context_block("Company", &company_results),
        context_block("Founders", &founder_results),
        context_block("Twitter", &twitter_results),
        context_block("Phone", &phone_results),
    ]
    .join("\n");

    let raw = match extractor.complete(&research_instruction(&company), &context).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "research extraction failed, skipping pass");
            state.push_log(format!("Researcher error: {e}"));
            return;
        }
    };

    let extracted: ResearchExtract = match parse_json_payload(&raw) {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!(error = %e, "research output unparseable, skipping pass");
            state.push_log(format!("Researcher error: {e}"));
            return;
        }
    };

    state.profile.apply_research(extracted);
    let found = state.profile.founders.len();
    info!(founders = found, "research pass merged");
    state.push_log(format!(
        "Researcher found basic info and {found} potential founders."
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeSearch, ScriptedExtractor};

    fn state() -> RunState {
        RunState::new("Acme Corp", None)
    }

    #[tokio::test]
    async fn merges_extracted_profile() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::ok_once(
            r#"{"domain": "acme.com", "description": "Widgets",
                "founders": [{"name": "Jane Doe", "title": "CEO"}]}"#,
        );

        let mut state = state();
        run(&search, &extractor, &mut state).await;

        assert_eq!(state.profile.domain.as_deref(), Some("acme.com"));
        assert_eq!(state.profile.founders.len(), 1);
        assert_eq!(state.profile.founders[0].name, "Jane Doe");
        assert!(state.log.iter().any(|l| l.contains("1 potential founders")));
    }

    #[tokio::test]
    async fn issues_four_searches() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::ok_once("{}");

        let mut state = state();
        run(&search, &extractor, &mut state).await;

        let queries = search.queries();
        assert_eq!(queries.len(), 4);
        assert!(queries[0].contains("official website"));
        assert!(queries[1].contains("founders of Acme Corp"));
        assert!(queries[2].contains("site:twitter.com"));
        assert!(queries[3].contains("phone number"));
    }

    #[tokio::test]
    async fn extraction_failure_is_a_no_op() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::err_once("rate limited");

        let mut state = state();
        state.profile.domain = Some("kept.com".into());
        run(&search, &extractor, &mut state).await;

        assert_eq!(state.profile.domain.as_deref(), Some("kept.com"));
        assert!(state.log.iter().any(|l| l.contains("Researcher error")));
    }

    #[tokio::test]
    async fn unparseable_output_is_a_no_op() {
        let search = FakeSearch::default();
        let extractor = ScriptedExtractor::ok_once("sorry, I found nothing useful");

        let mut state = state();
        state.profile.domain = Some("kept.com".into());
        run(&search, &extractor, &mut state).await;

        assert_eq!(state.profile.domain.as_deref(), Some("kept.com"));
        assert!(state.log.iter().any(|l| l.contains("Researcher error")));
    }
}
