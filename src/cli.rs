//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::SettingsOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "AI-powered multi-step research agent that produces Markdown reports",
    long_about = r#"
Deep Research - searches the web with an AI agent and writes a Markdown report.

The agent runs several Tavily searches, cross-references what it finds, and
answers with an executive summary, key findings, analysis and sources.

REQUIRED ENVIRONMENT (or .env file):
  OPENAI_API_KEY    Model provider credential
  TAVILY_API_KEY    Search provider credential

EXAMPLES:
  deep-research "impact of AI on healthcare"
  deep-research "Rust async runtimes" -o reports/rust-async.md
  deep-research "fusion energy" --model anthropic:claude-sonnet-4 --max-results 10
"#
)]
pub struct Args {
    /// Research topic or question
    #[arg(value_name = "TOPIC")]
    pub topic: String,

    /// File path to write the report to (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the model for this run (e.g. openai:gpt-5-mini)
    #[arg(short = 'm', long = "model", value_name = "PROVIDER:NAME")]
    pub model: Option<String>,

    /// Max search results per query (1-20)
    #[arg(long = "max-results", value_name = "N", allow_negative_numbers = true)]
    pub max_results: Option<i64>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            model: self.model.clone(),
            max_search_results: self.max_results,
        }
    }
}
