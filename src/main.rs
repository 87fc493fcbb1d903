//! # Deep Research CLI
//!
//! ```bash
//! deep-research "impact of AI on healthcare" -o reports/ai-health.md
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use deep_research::cli::Args;
use deep_research::config::{self, Settings};
use deep_research::logging::{self, LoggingConfig};
use deep_research::pipeline::{self, RigAgentFactory};
use deep_research::AppError;

// =============================================================================
// MAIN FUNCTION
// =============================================================================
/// Everything runs sequentially, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Settings come first so the configured log level can be honored.
    let dotenv = config::load_dotenv();
    let settings = Settings::load(&args.overrides());

    let configured_level = settings
        .as_ref()
        .map(Settings::log_level)
        .unwrap_or_default();
    if let Err(e) = logging::init(LoggingConfig::resolve(args.verbose, configured_level)) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    dotenv.log();

    let result = match settings {
        Ok(settings) => {
            info!(
                model = %settings.model(),
                max_results = settings.max_search_results(),
                output_dir = %settings.output_dir().display(),
                "Configuration loaded"
            );
            pipeline::run(&args.topic, args.output.as_deref(), &settings, &RigAgentFactory)
                .await
                .map(|_| ())
        }
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "{}", e.category());
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
