//! # Model Client Factory
//!
//! Turns a `provider:model-name` string into a chat-capable rig client.
//!
//! Supported providers:
//! - `openai`: uses `OPENAI_API_KEY`
//! - `anthropic`: uses `ANTHROPIC_API_KEY`
//! - `ollama`: local server at `OLLAMA_API_BASE_URL` (default `http://localhost:11434`)

use std::fmt;
use std::str::FromStr;

use rig::client::ProviderClient;
use rig::providers::{anthropic, ollama, openai};
use thiserror::Error;
use tracing::{error, info};

use crate::config::{ApiKey, Settings};

const MODEL_SEPARATOR: char = ':';

// =============================================================================
// ERRORS
// =============================================================================
#[derive(Error, Debug)]
pub enum LlmError {
    #[error(
        "Invalid model string '{0}'. Expected format: 'provider:model-name' (e.g., 'openai:gpt-5-mini')"
    )]
    MissingSeparator(String),

    #[error("Provider cannot be empty in model string '{0}'. Expected format: 'provider:model-name'")]
    EmptyProvider(String),

    #[error("Model name cannot be empty in model string '{0}'. Expected format: 'provider:model-name'")]
    EmptyModelName(String),

    #[error("Failed to initialize LLM '{identifier}': {source}")]
    Initialization {
        identifier: String,
        #[source]
        source: ProviderError,
    },
}

impl LlmError {
    /// True for malformed identifiers, false for provider-side failures.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, LlmError::Initialization { .. })
    }
}

/// Failures raised while constructing a provider client.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("unsupported provider '{0}' (supported: openai, anthropic, ollama)")]
    UnsupportedProvider(String),

    #[error("{0} is not set")]
    MissingCredential(&'static str),
}

// =============================================================================
// MODEL IDENTIFIER
// =============================================================================
/// A parsed `provider:model-name` pair.
///
/// Only the first `:` separates the two parts, so tagged model names such
/// as `ollama:llama3.2:latest` are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifier {
    provider: String,
    model_name: String,
}

impl ModelIdentifier {
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl FromStr for ModelIdentifier {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model_name) = s
            .split_once(MODEL_SEPARATOR)
            .ok_or_else(|| LlmError::MissingSeparator(s.to_string()))?;

        let provider = provider.trim();
        let model_name = model_name.trim();

        if provider.is_empty() {
            return Err(LlmError::EmptyProvider(s.to_string()));
        }
        if model_name.is_empty() {
            return Err(LlmError::EmptyModelName(s.to_string()));
        }

        Ok(Self {
            provider: provider.to_string(),
            model_name: model_name.to_string(),
        })
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.provider, MODEL_SEPARATOR, self.model_name)
    }
}

// =============================================================================
// PROVIDERS
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAI,
    Anthropic,
    Ollama,
}

impl FromStr for ModelProvider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ModelProvider::OpenAI),
            "anthropic" => Ok(ModelProvider::Anthropic),
            "ollama" => Ok(ModelProvider::Ollama),
            other => Err(ProviderError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Credentials the factory may hand to a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub openai: Option<ApiKey>,
    pub anthropic: Option<ApiKey>,
}

impl From<&Settings> for ProviderCredentials {
    fn from(settings: &Settings) -> Self {
        Self {
            openai: Some(settings.openai_api_key().clone()),
            anthropic: settings.anthropic_api_key().cloned(),
        }
    }
}

/// A provider client bound to one model.
pub struct ModelClient {
    identifier: ModelIdentifier,
    pub(crate) backend: Backend,
}

pub(crate) enum Backend {
    OpenAI(openai::Client),
    Anthropic(anthropic::Client),
    Ollama(ollama::Client),
}

impl ModelClient {
    pub fn identifier(&self) -> &ModelIdentifier {
        &self.identifier
    }

    pub fn model_name(&self) -> &str {
        self.identifier.model_name()
    }

    pub fn provider(&self) -> ModelProvider {
        match self.backend {
            Backend::OpenAI(_) => ModelProvider::OpenAI,
            Backend::Anthropic(_) => ModelProvider::Anthropic,
            Backend::Ollama(_) => ModelProvider::Ollama,
        }
    }
}

impl fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient")
            .field("identifier", &self.identifier.to_string())
            .field("provider", &self.provider())
            .finish()
    }
}

// =============================================================================
// FACTORY
// =============================================================================
/// Parse `identifier` and construct the matching provider client.
///
/// One attempt only; any failure is terminal for the run.
pub fn create_model_client(
    identifier: &str,
    credentials: &ProviderCredentials,
) -> Result<ModelClient, LlmError> {
    let parsed: ModelIdentifier = identifier.parse()?;
    info!(model = %parsed, "Initializing LLM");

    let backend = build_backend(&parsed, credentials).map_err(|source| {
        error!(model = %identifier, error = %source, "Failed to initialize LLM");
        LlmError::Initialization {
            identifier: identifier.to_string(),
            source,
        }
    })?;

    info!(model = %parsed, "LLM initialized successfully");
    Ok(ModelClient {
        identifier: parsed,
        backend,
    })
}

fn build_backend(
    identifier: &ModelIdentifier,
    credentials: &ProviderCredentials,
) -> Result<Backend, ProviderError> {
    match identifier.provider().parse::<ModelProvider>()? {
        ModelProvider::OpenAI => {
            let key = usable_key(credentials.openai.as_ref(), "OPENAI_API_KEY")?;
            Ok(Backend::OpenAI(openai::Client::from_val(key.into())))
        }
        ModelProvider::Anthropic => {
            let key = usable_key(credentials.anthropic.as_ref(), "ANTHROPIC_API_KEY")?;
            Ok(Backend::Anthropic(anthropic::Client::from_val(key)))
        }
        ModelProvider::Ollama => Ok(Backend::Ollama(ollama::Client::from_env())),
    }
}

fn usable_key(key: Option<&ApiKey>, name: &'static str) -> Result<String, ProviderError> {
    key.filter(|k| !k.is_blank())
        .map(|k| k.expose().to_string())
        .ok_or(ProviderError::MissingCredential(name))
}
