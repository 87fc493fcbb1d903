//! Markdown report rendering.

use chrono::{DateTime, Utc};

pub const REPORT_TITLE_PREFIX: &str = "Research Report";

/// `strftime` pattern for the "Generated" metadata field.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub const NO_FINDINGS_PLACEHOLDER: &str = "_No findings available._";

pub const ATTRIBUTION: &str = "*Generated by deep-research, an AI research agent. \
                               Verify important claims against the cited sources.*";

/// Render the final report.
///
/// `timestamp` defaults to the current UTC time. With an explicit
/// timestamp the output depends only on the arguments.
pub fn generate_report(
    topic: &str,
    findings: &str,
    model: &str,
    timestamp: Option<DateTime<Utc>>,
) -> String {
    let timestamp = timestamp.unwrap_or_else(Utc::now);

    let body = if findings.is_empty() {
        NO_FINDINGS_PLACEHOLDER
    } else {
        findings
    };

    format!(
        "# {REPORT_TITLE_PREFIX}: {topic}\n\
         \n\
         **Model:** {model} | **Generated:** {generated}\n\
         \n\
         ---\n\
         \n\
         {body}\n\
         \n\
         ---\n\
         \n\
         {ATTRIBUTION}\n",
        generated = timestamp.format(DATE_FORMAT),
    )
}
