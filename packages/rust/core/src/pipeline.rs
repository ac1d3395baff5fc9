//! Pipeline controller: the per-company research state machine.
//!
//! Research → Enrich → Validate, with a bounded retry loop that re-enters
//! Research from scratch when validation fails and the budget allows.

use tracing::{info, instrument, warn};

use prospector_providers::{ExtractionProvider, SearchProvider};
use prospector_shared::{InputRow, ProspectorError, Result, RunState};

use crate::{enricher, researcher, validator};

/// Controller states. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    Enrich,
    Validate,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Research => "research",
            Self::Enrich => "enrich",
            Self::Validate => "validate",
            Self::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum validator evaluations per company. The default of 2 allows
    /// exactly one retry pass after the first.
    pub max_validations: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_validations: 2 }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when the controller enters a stage. `pass` is 1-based.
    fn stage(&self, company: &str, stage: Stage, pass: u32);
    /// Called per founder during enrichment.
    fn founder(&self, name: &str, current: usize, total: usize);
    /// Called when a run reaches its terminal state.
    fn done(&self, state: &RunState);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _company: &str, _stage: Stage, _pass: u32) {}
    fn founder(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _state: &RunState) {}
}

/// Run the full pipeline for one input row, to completion.
///
/// Returns an error only when the row is missing its required company
/// name; every other failure mode degrades inside the stages and still
/// produces a finished [`RunState`]. The controller owns `retry_count`:
/// it is incremented once per validator evaluation, and the run ends when
/// the profile validates or the budget is spent. Retried passes re-enter
/// Research from scratch — no prior-pass search results are reused.
#[instrument(skip_all, fields(company = input.company_name.as_deref().unwrap_or("?")))]
pub async fn run_company<S, E>(
    search: &S,
    extractor: &E,
    input: &InputRow,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunState>
where
    S: SearchProvider,
    E: ExtractionProvider,
{
    let company_name = input
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ProspectorError::validation("input row has no company name"))?;

    let mut state = RunState::new(company_name, input.reference_id.clone());
    let mut stage = Stage::Research;

    info!(run_id = %state.run_id, "starting research run");

    loop {
        let pass = state.retry_count + 1;
        progress.stage(&state.profile.name, stage, pass);

        match stage {
            Stage::Research => {
                researcher::run(search, extractor, &mut state).await;
                stage = Stage::Enrich;
            }
            Stage::Enrich => {
                enricher::run(search, extractor, &mut state, progress).await;
                stage = Stage::Validate;
            }
            Stage::Validate => {
                let report = validator::validate(&state.profile);
                state.retry_count += 1;
                state.is_valid = report.is_valid;
                state.defects = report.defects;

                if state.is_valid {
                    stage = Stage::Done;
                } else if state.retry_count >= config.max_validations {
                    warn!(
                        run_id = %state.run_id,
                        defects = state.defects.len(),
                        "retry budget exhausted, finishing with defects"
                    );
                    state.push_log("Retry budget exhausted.".to_string());
                    stage = Stage::Done;
                } else {
                    info!(
                        run_id = %state.run_id,
                        defects = state.defects.len(),
                        "validation failed, re-entering research"
                    );
                    state.push_log(format!(
                        "Validation failed ({} defects), retrying.",
                        state.defects.len()
                    ));
                    stage = Stage::Research;
                }
            }
            Stage::Done => break,
        }
    }

    info!(
        run_id = %state.run_id,
        is_valid = state.is_valid,
        validations = state.retry_count,
        founders = state.profile.founders.len(),
        "research run complete"
    );
    progress.done(&state);

    Ok(state)
}
