//! # Pipeline Driver
//!
//! Runs one topic through the fixed sequence:
//! model client → search tool → agent → research → report → output.
//!
//! Each stage runs once. The first failure aborts the run.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use async_trait::async_trait;
use tracing::{error, info};

use crate::agent::{create_research_agent, run_research, AgentOptions, ResearchAgent};
use crate::config::Settings;
use crate::error::AppError;
use crate::llm::{create_model_client, ProviderCredentials};
use crate::report::generate_report;
use crate::tools::search::create_search_tool;

// =============================================================================
// AGENT FACTORY SEAM
// =============================================================================
/// Builds the agent for a run from validated settings.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn build(&self, settings: &Settings) -> Result<Box<dyn ResearchAgent>, AppError>;
}

/// Production factory: rig model client plus the Tavily search tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RigAgentFactory;

#[async_trait]
impl AgentFactory for RigAgentFactory {
    async fn build(&self, settings: &Settings) -> Result<Box<dyn ResearchAgent>, AppError> {
        let model = create_model_client(settings.model(), &ProviderCredentials::from(settings))?;
        let search_tool = create_search_tool(settings.tavily_api_key(), settings.max_search_results())?;

        let options = AgentOptions {
            max_turns: settings.max_agent_turns(),
            ..AgentOptions::default()
        };
        Ok(create_research_agent(&model, vec![search_tool], options))
    }
}

// =============================================================================
// RUN
// =============================================================================
/// Research `topic` and write the report to `output` (stdout when `None`).
///
/// Returns the report that was written.
pub async fn run(
    topic: &str,
    output: Option<&Path>,
    settings: &Settings,
    factory: &dyn AgentFactory,
) -> Result<String, AppError> {
    let agent = factory.build(settings).await?;
    let findings = run_research(agent.as_ref(), topic).await?;
    let report = generate_report(topic, &findings, settings.model(), None);
    write_output(&report, output)?;
    Ok(report)
}

// =============================================================================
// OUTPUT
// =============================================================================
/// Print the report, or write it as the whole content of `path`.
///
/// Missing parent directories are created; an existing file is replaced.
pub fn write_output(report: &str, path: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        return writeln!(stdout, "{report}").map_err(|source| AppError::Io {
            path: "<stdout>".into(),
            source,
        });
    };

    let result = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, report));

    match result {
        Ok(()) => {
            info!(path = %path.display(), "Report written");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Failed to write report");
            Err(AppError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
