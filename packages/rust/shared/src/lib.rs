//! Shared types, error model, and configuration for Prospector.
//!
//! This crate is the foundation depended on by all other Prospector crates.
//! It provides:
//! - [`ProspectorError`] — the unified error type
//! - Domain types ([`CompanyProfile`], [`FounderRecord`], [`RunState`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ExtractionConfig, SearchConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_keys,
};
pub use error::{ProspectorError, Result};
pub use types::{
    CompanyProfile, FounderExtract, FounderRecord, InputRow, OutputRow, ResearchExtract, RunId,
    RunState,
};
