//! Top-level error type for a pipeline run.

use std::path::PathBuf;

use thiserror::Error;

use crate::agent::ResearchError;
use crate::config::ConfigError;
use crate::llm::LlmError;
use crate::tools::search::SearchToolError;

/// Any failure that aborts a run. Nothing is retried.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] LlmError),

    #[error(transparent)]
    SearchTool(#[from] SearchToolError),

    #[error(transparent)]
    Research(#[from] ResearchError),

    #[error("failed to write output file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Short label for the failing stage, used as the log message.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Configuration error",
            AppError::Model(e) if e.is_format_error() => "Invalid model identifier",
            AppError::Model(_) => "Model client initialization failed",
            AppError::SearchTool(_) => "Search tool initialization failed",
            AppError::Research(_) => "Research failed",
            AppError::Io { .. } => "File I/O error",
        }
    }

    /// The single line shown on stderr.
    ///
    /// Configuration problems get a generic hint; the specific field is in
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) => "Error: missing or invalid configuration. \
                                    Check your .env file or environment variables."
                .to_string(),
            other => format!("Error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;

    #[test]
    fn test_config_error_message_is_generic() {
        let err = AppError::from(ConfigError::MissingFields(vec!["OPENAI_API_KEY"]));
        let msg = err.user_message();
        assert!(msg.starts_with("Error: missing or invalid configuration"));
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn test_research_error_message_is_verbatim() {
        let err = AppError::from(ResearchError::AgentFailed {
            topic: "quantum".to_string(),
            source: AgentError::Runtime("API timeout".to_string()),
        });
        assert_eq!(
            err.user_message(),
            "Error: Research agent failed for topic 'quantum': API timeout"
        );
    }

    #[test]
    fn test_format_error_message_is_verbatim() {
        let err = AppError::from(LlmError::EmptyProvider(":gpt".to_string()));
        assert!(err.user_message().starts_with("Error: Provider cannot be empty"));
    }

    #[test]
    fn test_category_separates_format_from_initialization() {
        use crate::llm::ProviderError;

        let format = AppError::from(LlmError::MissingSeparator("gpt-5-mini".to_string()));
        assert_eq!(format.category(), "Invalid model identifier");

        let init = AppError::from(LlmError::Initialization {
            identifier: "mistral:large".to_string(),
            source: ProviderError::UnsupportedProvider("mistral".to_string()),
        });
        assert_eq!(init.category(), "Model client initialization failed");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = AppError::Io {
            path: PathBuf::from("/nope/report.md"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let msg = err.user_message();
        assert!(msg.starts_with("Error: failed to write output file '/nope/report.md'"));
    }
}
