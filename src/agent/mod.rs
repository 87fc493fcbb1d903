//! # Agent Module
//!
//! The research agent: a rig reasoning loop over one model client and a
//! set of search tools, plus the runner that submits a topic to it.

mod prompts;
mod researcher;

pub use prompts::RESEARCH_SYSTEM_PROMPT;
pub use researcher::{
    create_research_agent, run_research, AgentError, AgentOptions, ChatMessage, ResearchAgent,
    ResearchError, RigResearchAgent, Role,
};
