//! Tavily web search tool
//!
//! Wraps the Tavily Search API behind rig's `Tool` trait so the research
//! agent can call it by name with a single free-text query.
//!
//! Requests are made once; HTTP failures are mapped to typed errors and
//! handed back to the agent runtime without retrying.

use std::time::Duration;

use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ApiKey, MAX_SEARCH_RESULTS_LIMIT, MIN_SEARCH_RESULTS};

pub const SEARCH_TOOL_NAME: &str = "tavily_search";

/// Result cap used when the caller has no preference.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Default timeout for Tavily API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tavily rejects longer queries.
const MAX_QUERY_CHARS: usize = 400;

// =============================================================================
// ERRORS
// =============================================================================
/// Failure to construct the search tool.
#[derive(Debug, Error)]
pub enum SearchToolError {
    #[error("Failed to create Tavily search tool: {0}")]
    Initialization(String),
}

/// Failure of a single search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check TAVILY_API_KEY")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Query too long (max 400 characters)")]
    QueryTooLong,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

// =============================================================================
// RESULT RECORDS
// =============================================================================
/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    topic: &'static str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        Self {
            title: r.title,
            url: r.url,
            snippet: r.content,
        }
    }
}

// =============================================================================
// SEARCH TOOL
// =============================================================================
/// Tavily search bound to an API key and a per-query result cap.
#[derive(Debug, Clone)]
pub struct SearchTool {
    api_key: ApiKey,
    max_results: u32,
    client: Client,
    base_url: String,
    timeout: Duration,
}

/// Build a search tool for the agent.
///
/// Rejects a blank key or a cap outside 1..=20. Nothing is sent to Tavily
/// until the agent first calls the tool.
pub fn create_search_tool(api_key: &ApiKey, max_results: u32) -> Result<SearchTool, SearchToolError> {
    info!(max_results, "Creating Tavily search tool");

    if api_key.is_blank() {
        return Err(SearchToolError::Initialization(
            "TAVILY_API_KEY is empty".to_string(),
        ));
    }
    if !(MIN_SEARCH_RESULTS..=MAX_SEARCH_RESULTS_LIMIT).contains(&max_results) {
        return Err(SearchToolError::Initialization(format!(
            "max_results must be between {MIN_SEARCH_RESULTS} and {MAX_SEARCH_RESULTS_LIMIT}, got {max_results}"
        )));
    }

    let client = Client::builder()
        .build()
        .map_err(|e| SearchToolError::Initialization(e.to_string()))?;

    info!("Tavily search tool created successfully");
    Ok(SearchTool {
        api_key: api_key.clone(),
        max_results,
        client,
        base_url: DEFAULT_BASE_URL.to_string(),
        timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    })
}

impl SearchTool {
    /// Point the tool at a different Tavily-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Run one query and return at most `max_results` hits, best first.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(SearchError::QueryTooLong);
        }

        info!(query = %query, "Performing web search");

        let request = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
            topic: "general",
            include_answer: false,
            include_raw_content: false,
        };

        let url = format!("{}/search", self.base_url);
        debug!(url = %url, "Sending Tavily request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => SearchError::Unauthorized,
                429 => SearchError::RateLimited,
                400 => SearchError::BadRequest(body),
                code @ 500..=599 => SearchError::ServerError(code, body),
                code => SearchError::HttpError(code, body),
            });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let results: Vec<SearchResult> = parsed
            .results
            .into_iter()
            .take(self.max_results as usize)
            .map(SearchResult::from)
            .collect();

        if results.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = results.len(), "Search completed");
        }

        Ok(results)
    }
}

/// Render hits as a numbered Markdown list for the model.
fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for: {query}");
    }

    let formatted = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. **{}**\n   URL: {}\n   {}\n", i + 1, r.title, r.url, r.snippet))
        .collect::<Vec<_>>()
        .join("\n");

    format!("## Search Results for: {query}\n\n{formatted}")
}

// =============================================================================
// RIG TOOL TRAIT IMPLEMENTATION
// =============================================================================
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchArgs {
    pub query: String,
}

impl Tool for SearchTool {
    const NAME: &'static str = SEARCH_TOOL_NAME;

    type Args = SearchArgs;
    type Output = String;
    type Error = SearchError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web using the Tavily Search API. Returns relevant pages \
                          with titles, URLs, and content snippets."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to execute",
                        "maxLength": MAX_QUERY_CHARS
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let results = self.search(&args.query).await?;
        Ok(format_results(&args.query, &results))
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn tool(max_results: u32) -> SearchTool {
        create_search_tool(&ApiKey::new("test-key"), max_results).unwrap()
    }

    #[test]
    fn test_create_search_tool_binds_cap() {
        assert_eq!(tool(5).max_results(), 5);
        assert_eq!(tool(20).max_results(), 20);
    }

    #[test]
    fn test_create_search_tool_rejects_blank_key() {
        let err = create_search_tool(&ApiKey::new(""), 5).unwrap_err();
        assert!(err.to_string().contains("Failed to create Tavily search tool"));
    }

    #[test]
    fn test_create_search_tool_rejects_bad_cap() {
        assert!(create_search_tool(&ApiKey::new("k"), 0).is_err());
        assert!(create_search_tool(&ApiKey::new("k"), 21).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let debug = format!("{:?}", tool(5));
        assert!(!debug.contains("test-key"));
    }

    #[tokio::test]
    async fn test_tool_definition() {
        let def = tool(5).definition(String::new()).await;

        assert_eq!(def.name, "tavily_search");
        assert!(def.description.contains("Search the web"));
        let required = def.parameters["required"].as_array().unwrap();
        assert_eq!(required, &vec![serde_json::json!("query")]);
        assert_eq!(def.parameters["properties"]["query"]["maxLength"], 400);
    }

    #[test]
    fn test_format_results() {
        let results = vec![
            SearchResult {
                title: "Rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                snippet: "A language empowering everyone.".to_string(),
            },
            SearchResult {
                title: "Book".to_string(),
                url: "https://doc.rust-lang.org/book/".to_string(),
                snippet: "The Rust Programming Language.".to_string(),
            },
        ];

        let out = format_results("rust", &results);
        assert!(out.starts_with("## Search Results for: rust"));
        assert!(out.contains("1. **Rust**\n   URL: https://rust-lang.org"));
        assert!(out.contains("2. **Book**"));
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(format_results("xyz", &[]), "No results found for: xyz");
    }

    #[tokio::test]
    async fn test_query_too_long() {
        let query = "x".repeat(401);
        let err = tool(5).search(&query).await.unwrap_err();
        assert!(matches!(err, SearchError::QueryTooLong));
    }
}
