//! Prospector CLI — company and founder research tool.
//!
//! Turns a CSV of bare company names into a structured company-and-founder
//! dataset via web search and LLM extraction, with validation-gated
//! retries per company.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
