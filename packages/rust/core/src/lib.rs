//! Research pipeline core: stages, controller, and report flattening.
//!
//! One company flows through Researcher → Enricher → Validator; a failed
//! validation re-enters the Researcher for at most one more full pass.
//! All external effects go through the injected [`SearchProvider`] and
//! [`ExtractionProvider`](prospector_providers::ExtractionProvider)
//! capabilities.
//!
//! [`SearchProvider`]: prospector_providers::SearchProvider

pub mod enricher;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod researcher;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;
