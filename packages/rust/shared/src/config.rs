//! Application configuration for Prospector.
//!
//! User config lives at `~/.prospector/prospector.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProspectorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "prospector.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".prospector";

// ---------------------------------------------------------------------------
// Config structs (matching prospector.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Web search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Extraction (LLM) provider settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output CSV path.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Maximum validator evaluations per company (2 = at most one retry
    /// pass after the first).
    #[serde(default = "default_max_validations")]
    pub max_validations: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            max_validations: default_max_validations(),
        }
    }
}

fn default_output_file() -> String {
    "enriched_companies.csv".into()
}
fn default_max_validations() -> u32 {
    2
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,

    /// Search depth passed to the provider ("basic" or "advanced").
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Maximum results per query.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_api_key_env(),
            search_depth: default_search_depth(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_search_api_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn default_search_depth() -> String {
    "advanced".into()
}
fn default_max_results() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_extraction_api_key_env")]
    pub api_key_env: String,

    /// Chat-completions base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default model to use for extraction.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_extraction_api_key_env(),
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_extraction_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.prospector/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProspectorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.prospector/prospector.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProspectorError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ProspectorError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ProspectorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ProspectorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ProspectorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the env var a config section names.
fn read_api_key(var_name: &str, hint: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ProspectorError::config(format!(
            "API key not found. Set the {var_name} environment variable.\n{hint}"
        ))),
    }
}

impl SearchConfig {
    /// Resolve the search API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        read_api_key(
            &self.api_key_env,
            "Get a key at https://tavily.com",
        )
    }
}

impl ExtractionConfig {
    /// Resolve the extraction API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        read_api_key(
            &self.api_key_env,
            "Get a key at https://openrouter.ai/keys",
        )
    }
}

/// Check that both provider API key env vars are set and non-empty.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    config.search.api_key()?;
    config.extraction.api_key()?;
    Ok(())
}
