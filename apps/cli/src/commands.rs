//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use prospector_core::pipeline::{self, PipelineConfig, ProgressReporter, Stage};
use prospector_core::report;
use prospector_providers::{OpenRouterExtractor, TavilySearch};
use prospector_shared::{
    AppConfig, InputRow, OutputRow, RunState, config_file_path, init_config, load_config,
    validate_api_keys,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Prospector — company and founder research from bare company names.
#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "Research companies and their founders into an enriched CSV dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research every company in an input CSV and write the enriched dataset.
    Run {
        /// Input CSV file (columns: "Company Name", optional "LinkedIn URL").
        #[arg(short, long)]
        input: String,

        /// Output CSV file (defaults to the configured output_file).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Research a single company and print the profile as JSON.
    One {
        /// Company name to research.
        company_name: String,

        /// Opaque reference identifier carried through to the profile.
        #[arg(long)]
        reference_id: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { input, output } => cmd_run(&input, output.as_deref()).await,
        Command::One {
            company_name,
            reference_id,
        } => cmd_one(&company_name, reference_id).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Build both providers from config, resolving API keys up front.
fn build_providers(config: &AppConfig) -> Result<(TavilySearch, OpenRouterExtractor)> {
    validate_api_keys(config)?;
    let search = TavilySearch::new(config.search.api_key()?, &config.search)?;
    let extractor = OpenRouterExtractor::new(config.extraction.api_key()?, &config.extraction)?;
    Ok((search, extractor))
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(input: &str, output: Option<&str>) -> Result<()> {
    let start = Instant::now();
    let config = load_config()?;
    let (search, extractor) = build_providers(&config)?;

    let rows = report::read_input_rows(Path::new(input))?;
    if rows.is_empty() {
        return Err(eyre!("no input rows found in '{input}'"));
    }

    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_file));

    let pipeline_config = PipelineConfig {
        max_validations: config.defaults.max_validations,
    };

    info!(companies = rows.len(), output = %output_path.display(), "starting research batch");

    let reporter = CliProgress::new();
    let mut results: Vec<OutputRow> = Vec::new();
    let mut valid = 0usize;

    for row in &rows {
        match pipeline::run_company(&search, &extractor, row, &pipeline_config, &reporter).await {
            Ok(state) => {
                if state.is_valid {
                    valid += 1;
                }
                results.push(report::flatten(&state));
            }
            Err(e) => {
                // Only a missing company name lands here; skip the row.
                warn!(error = %e, "skipping input row");
            }
        }
    }
    reporter.finish();

    report::write_output_rows(&output_path, &results)?;

    println!();
    println!("  Research complete!");
    println!("  Companies: {}", results.len());
    println!("  Valid:     {valid}");
    println!("  Flagged:   {}", results.len() - valid);
    println!("  Output:    {}", output_path.display());
    println!("  Time:      {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// one
// ---------------------------------------------------------------------------

async fn cmd_one(company_name: &str, reference_id: Option<String>) -> Result<()> {
    let config = load_config()?;
    let (search, extractor) = build_providers(&config)?;

    let pipeline_config = PipelineConfig {
        max_validations: config.defaults.max_validations,
    };

    let row = InputRow {
        company_name: Some(company_name.to_string()),
        reference_id,
    };

    let reporter = CliProgress::new();
    let state =
        pipeline::run_company(&search, &extractor, &row, &pipeline_config, &reporter).await?;
    reporter.finish();

    let rendered = serde_json::json!({
        "profile": state.profile,
        "is_valid": state.is_valid,
        "defects": state.defects,
    });
    println!("{}", serde_json::to_string_pretty(&rendered)?);

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created default config at {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("# {}", config_file_path()?.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, company: &str, stage: Stage, pass: u32) {
        let label = match stage {
            Stage::Research => "Researching",
            Stage::Enrich => "Enriching",
            Stage::Validate => "Validating",
            Stage::Done => "Finishing",
        };
        self.spinner
            .set_message(format!("{label} {company} (pass {pass})"));
    }

    fn founder(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching founder [{current}/{total}] {name}"));
    }

    fn done(&self, state: &RunState) {
        let verdict = if state.is_valid { "ok" } else { "flagged" };
        self.spinner
            .println(format!("  {} — {verdict}", state.profile.name));
    }
}
