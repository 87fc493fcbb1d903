//! Research agent construction and invocation.
//!
//! The reasoning-and-acting loop itself belongs to rig: at each step the
//! model either calls a tool or answers. This module only supplies the
//! policy prompt and tool roster, then hands the topic over once.

use async_trait::async_trait;
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::completion::{CompletionModel, Prompt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::prompts::RESEARCH_SYSTEM_PROMPT;
use crate::config::DEFAULT_MAX_AGENT_TURNS;
use crate::llm::{Backend, ModelClient};
use crate::tools::search::SearchTool;

// =============================================================================
// CONVERSATION TYPES
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================
/// Failure inside the agent runtime.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("conversation must end with a user message")]
    NoPrompt,

    #[error("{0}")]
    Runtime(String),
}

/// Failure of a research run.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Research agent failed for topic '{topic}': {source}")]
    AgentFailed {
        topic: String,
        #[source]
        source: AgentError,
    },
}

// =============================================================================
// AGENT SEAM
// =============================================================================
/// A compiled reasoning loop: submit a conversation, get the final
/// conversation back.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<Vec<ChatMessage>, AgentError>;
}

/// `ResearchAgent` backed by a rig `Agent`.
pub struct RigResearchAgent<M>
where
    M: CompletionModel,
{
    agent: Agent<M>,
    max_turns: usize,
}

impl<M> RigResearchAgent<M>
where
    M: CompletionModel,
{
    pub fn new(agent: Agent<M>, max_turns: usize) -> Self {
        Self { agent, max_turns }
    }
}

#[async_trait]
impl<M> ResearchAgent for RigResearchAgent<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    /// Only the trailing user message is sent as the prompt; rig keeps the
    /// intermediate tool calls to itself, so the returned conversation is
    /// the input plus the final assistant answer.
    async fn invoke(&self, mut messages: Vec<ChatMessage>) -> Result<Vec<ChatMessage>, AgentError> {
        let prompt = match messages.last() {
            Some(message) if message.role == Role::User => message.content.clone(),
            _ => return Err(AgentError::NoPrompt),
        };

        debug!(max_turns = self.max_turns, "Prompting rig agent");

        let answer = self
            .agent
            .prompt(&prompt)
            .multi_turn(self.max_turns)
            .await
            .map_err(|e| AgentError::Runtime(e.to_string()))?;

        messages.push(ChatMessage::assistant(answer));
        Ok(messages)
    }
}

// =============================================================================
// AGENT BUILDER
// =============================================================================
/// Knobs for `create_research_agent`.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub system_prompt: String,
    /// Upper bound on tool-calling round trips.
    pub max_turns: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            system_prompt: RESEARCH_SYSTEM_PROMPT.to_string(),
            max_turns: DEFAULT_MAX_AGENT_TURNS,
        }
    }
}

/// Expands per provider so the concrete rig builder types never need naming.
macro_rules! build_rig_agent {
    ($client:expr, $model:expr, $options:expr, $tools:expr) => {{
        let mut tools = $tools.into_iter();
        let agent = match tools.next() {
            None => $client.agent($model).preamble(&$options.system_prompt).build(),
            Some(first) => {
                let mut builder = $client.agent($model).preamble(&$options.system_prompt).tool(first);
                for tool in tools {
                    builder = builder.tool(tool);
                }
                builder.build()
            }
        };
        Box::new(RigResearchAgent::new(agent, $options.max_turns)) as Box<dyn ResearchAgent>
    }};
}

/// Compose a model client and tools into a fresh research agent.
///
/// Must be called within a tokio runtime: rig spawns the agent's tool
/// server as a task when the agent is built.
pub fn create_research_agent(
    model: &ModelClient,
    tools: Vec<SearchTool>,
    options: AgentOptions,
) -> Box<dyn ResearchAgent> {
    info!(
        model = %model.identifier(),
        tools = tools.len(),
        max_turns = options.max_turns,
        "Creating research agent"
    );

    let model_name = model.model_name();
    let agent = match &model.backend {
        Backend::OpenAI(client) => build_rig_agent!(client, model_name, options, tools),
        Backend::Anthropic(client) => build_rig_agent!(client, model_name, options, tools),
        Backend::Ollama(client) => build_rig_agent!(client, model_name, options, tools),
    };

    info!("Research agent created successfully");
    agent
}

// =============================================================================
// RESEARCH RUNNER
// =============================================================================
/// Ask the agent to research `topic` and return its final answer.
///
/// An agent that returns no messages yields an empty string rather than
/// an error; a failing agent is fatal.
pub async fn run_research(agent: &dyn ResearchAgent, topic: &str) -> Result<String, ResearchError> {
    info!(topic = %topic, "Starting research");

    let messages = agent
        .invoke(vec![ChatMessage::user(topic)])
        .await
        .map_err(|source| {
            error!(topic = %topic, error = %source, "Research agent failed");
            ResearchError::AgentFailed {
                topic: topic.to_string(),
                source,
            }
        })?;

    let Some(last) = messages.last() else {
        warn!(topic = %topic, "Agent returned no messages");
        return Ok(String::new());
    };

    info!(topic = %topic, chars = last.content.len(), "Research completed");
    Ok(last.content.clone())
}
