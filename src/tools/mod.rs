//! Tools the research agent can call.

pub mod search;

pub use search::{create_search_tool, SearchError, SearchResult, SearchTool, SearchToolError};
