//! # Configuration Module
//!
//! Loads the research agent's settings from the environment.
//!
//! Values are resolved in this order (first match wins):
//! 1. Explicit overrides (command-line flags)
//! 2. Process environment variables
//! 3. A local `.env` file, if present
//! 4. Compiled-in defaults
//!
//! A `Settings` value is built once in `main` and passed by reference to
//! every stage that needs it. Nothing in the pipeline reads the
//! environment on its own.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

// =============================================================================
// DEFAULTS AND BOUNDS
// =============================================================================
pub const DEFAULT_MODEL: &str = "openai:gpt-5-mini";
pub const DEFAULT_MAX_SEARCH_RESULTS: u32 = crate::tools::search::DEFAULT_MAX_RESULTS;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_MAX_AGENT_TURNS: usize = 10;

pub const MIN_SEARCH_RESULTS: u32 = 1;
pub const MAX_SEARCH_RESULTS_LIMIT: u32 = 20;

pub const MIN_AGENT_TURNS: usize = 1;
pub const MAX_AGENT_TURNS_LIMIT: usize = 50;

/// Environment variable names.
pub mod vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const MODEL: &str = "MODEL";
    pub const MAX_SEARCH_RESULTS: &str = "MAX_SEARCH_RESULTS";
    pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const MAX_AGENT_TURNS: &str = "MAX_AGENT_TURNS";
}

// =============================================================================
// ERRORS
// =============================================================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} must be an integer, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("LOG_LEVEL must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL, got '{0}'")]
    InvalidLogLevel(String),
}

// =============================================================================
// SECRETS
// =============================================================================
/// An API credential. Never printed, even in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for handing to an HTTP client.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// =============================================================================
// LOG LEVEL
// =============================================================================
/// The fixed set of accepted log levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// .ENV FILE
// =============================================================================
/// What happened when looking for a local `.env` file.
#[derive(Debug)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    NotFound,
    Invalid(dotenvy::Error),
}

impl DotenvStatus {
    fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => DotenvStatus::Loaded(path),
            // A missing .env file is fine; variables may come from the shell.
            Err(dotenvy::Error::Io(_)) => DotenvStatus::NotFound,
            Err(e) => DotenvStatus::Invalid(e),
        }
    }

    /// Report the outcome. Runs after logging is up, since the file is
    /// read before the log level is known.
    pub fn log(&self) {
        match self {
            DotenvStatus::Loaded(path) => debug!(path = %path.display(), "Loaded .env file"),
            DotenvStatus::NotFound => debug!("No .env file found"),
            DotenvStatus::Invalid(e) => warn!(error = %e, "Failed to load .env file"),
        }
    }
}

/// Load a local `.env` file into the process environment without
/// overriding variables that are already set.
pub fn load_dotenv() -> DotenvStatus {
    DotenvStatus::from_result(dotenvy::dotenv())
}

// =============================================================================
// SETTINGS
// =============================================================================
/// Per-run overrides, usually taken from command-line flags.
///
/// `max_search_results` is signed so that values like `-1` reach
/// validation and are reported as out of range.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub model: Option<String>,
    pub max_search_results: Option<i64>,
}

/// Validated application settings.
///
/// Fields are private so a `Settings` can only come out of validation.
#[derive(Debug, Clone)]
pub struct Settings {
    openai_api_key: ApiKey,
    tavily_api_key: ApiKey,
    anthropic_api_key: Option<ApiKey>,
    model: String,
    max_search_results: u32,
    output_dir: PathBuf,
    log_level: LogLevel,
    max_agent_turns: usize,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Call [`load_dotenv`] first for `.env` values to be visible here.
    pub fn load(overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Build settings from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F, overrides: &SettingsOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = get(vars::OPENAI_API_KEY).map(ApiKey::new);
        let tavily_api_key = get(vars::TAVILY_API_KEY).map(ApiKey::new);

        let (openai_api_key, tavily_api_key) = match (openai_api_key, tavily_api_key) {
            (Some(openai), Some(tavily)) => (openai, tavily),
            (openai, tavily) => {
                let mut missing = Vec::new();
                if openai.is_none() {
                    missing.push(vars::OPENAI_API_KEY);
                }
                if tavily.is_none() {
                    missing.push(vars::TAVILY_API_KEY);
                }
                return Err(ConfigError::MissingFields(missing));
            }
        };

        let model = overrides
            .model
            .clone()
            .or_else(|| get(vars::MODEL))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_search_results = match overrides.max_search_results {
            Some(value) => value,
            None => match get(vars::MAX_SEARCH_RESULTS) {
                Some(raw) => parse_integer(vars::MAX_SEARCH_RESULTS, &raw)?,
                None => i64::from(DEFAULT_MAX_SEARCH_RESULTS),
            },
        };
        let max_search_results = check_range(
            "max_search_results",
            max_search_results,
            i64::from(MIN_SEARCH_RESULTS),
            i64::from(MAX_SEARCH_RESULTS_LIMIT),
        )? as u32;

        let max_agent_turns = match get(vars::MAX_AGENT_TURNS) {
            Some(raw) => parse_integer(vars::MAX_AGENT_TURNS, &raw)?,
            None => DEFAULT_MAX_AGENT_TURNS as i64,
        };
        let max_agent_turns = check_range(
            "max_agent_turns",
            max_agent_turns,
            MIN_AGENT_TURNS as i64,
            MAX_AGENT_TURNS_LIMIT as i64,
        )? as usize;

        let log_level = match get(vars::LOG_LEVEL) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };

        let output_dir = get(vars::OUTPUT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let settings = Self {
            openai_api_key,
            tavily_api_key,
            anthropic_api_key: get(vars::ANTHROPIC_API_KEY).map(ApiKey::new),
            model,
            max_search_results,
            output_dir,
            log_level,
            max_agent_turns,
        };

        debug!(
            model = %settings.model,
            max_results = settings.max_search_results,
            max_turns = settings.max_agent_turns,
            "Settings loaded"
        );

        Ok(settings)
    }

    pub fn openai_api_key(&self) -> &ApiKey {
        &self.openai_api_key
    }

    pub fn tavily_api_key(&self) -> &ApiKey {
        &self.tavily_api_key
    }

    pub fn anthropic_api_key(&self) -> Option<&ApiKey> {
        self.anthropic_api_key.as_ref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_search_results(&self) -> u32 {
        self.max_search_results
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn max_agent_turns(&self) -> usize {
        self.max_agent_turns
    }
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_dotenv_missing_file_is_not_found() {
        let err = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(DotenvStatus::from_result(Err(err)), DotenvStatus::NotFound));
    }

    #[test]
    fn test_dotenv_parse_error_is_invalid() {
        let err = dotenvy::Error::LineParse("NOT A VALID LINE".to_string(), 3);
        assert!(matches!(DotenvStatus::from_result(Err(err)), DotenvStatus::Invalid(_)));
    }

    #[test]
    fn test_dotenv_malformed_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "not a valid line\n").unwrap();

        let status = DotenvStatus::from_result(dotenvy::from_path(&path).map(|()| path.clone()));
        assert!(matches!(status, DotenvStatus::Invalid(_)));
    }

    fn required() -> HashMap<String, String> {
        env(&[
            (vars::OPENAI_API_KEY, "test-openai-key"),
            (vars::TAVILY_API_KEY, "test-tavily-key"),
        ])
    }

    fn load(map: &HashMap<String, String>, overrides: &SettingsOverrides) -> Result<Settings, ConfigError> {
        Settings::from_lookup(|key| map.get(key).cloned(), overrides)
    }

    #[test]
    fn test_defaults_with_required_keys() {
        let settings = load(&required(), &SettingsOverrides::default()).unwrap();

        assert_eq!(settings.openai_api_key().expose(), "test-openai-key");
        assert_eq!(settings.tavily_api_key().expose(), "test-tavily-key");
        assert_eq!(settings.model(), DEFAULT_MODEL);
        assert_eq!(settings.max_search_results(), DEFAULT_MAX_SEARCH_RESULTS);
        assert_eq!(settings.output_dir(), &PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(settings.log_level(), LogLevel::Info);
        assert_eq!(settings.max_agent_turns(), DEFAULT_MAX_AGENT_TURNS);
        assert!(settings.anthropic_api_key().is_none());
    }

    #[test]
    fn test_missing_openai_key() {
        let map = env(&[(vars::TAVILY_API_KEY, "t")]);
        let err = load(&map, &SettingsOverrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingFields(vec![vars::OPENAI_API_KEY]));
    }

    #[test]
    fn test_missing_both_keys_names_both() {
        let err = load(&HashMap::new(), &SettingsOverrides::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OPENAI_API_KEY"));
        assert!(msg.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let map = env(&[(vars::OPENAI_API_KEY, "k"), (vars::TAVILY_API_KEY, "   ")]);
        let err = load(&map, &SettingsOverrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingFields(vec![vars::TAVILY_API_KEY]));
    }

    #[test]
    fn test_max_search_results_valid_range() {
        for n in 1..=20 {
            let mut map = required();
            map.insert(vars::MAX_SEARCH_RESULTS.to_string(), n.to_string());
            let settings = load(&map, &SettingsOverrides::default()).unwrap();
            assert_eq!(settings.max_search_results(), n);
        }
    }

    #[test]
    fn test_max_search_results_out_of_range() {
        for n in [0, 21, -1] {
            let mut map = required();
            map.insert(vars::MAX_SEARCH_RESULTS.to_string(), n.to_string());
            let err = load(&map, &SettingsOverrides::default()).unwrap_err();
            assert!(
                matches!(err, ConfigError::OutOfRange { value, min: 1, max: 20, .. } if value == n),
                "unexpected error for {n}: {err:?}"
            );
        }
    }

    #[test]
    fn test_out_of_range_message_names_value_and_range() {
        let overrides = SettingsOverrides {
            max_search_results: Some(21),
            ..Default::default()
        };
        let err = load(&required(), &overrides).unwrap_err();
        assert_eq!(
            err.to_string(),
            "max_search_results must be between 1 and 20, got 21"
        );
    }

    #[test]
    fn test_max_search_results_not_a_number() {
        let mut map = required();
        map.insert(vars::MAX_SEARCH_RESULTS.to_string(), "lots".to_string());
        let err = load(&map, &SettingsOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_overrides_take_precedence_over_environment() {
        let mut map = required();
        map.insert(vars::MODEL.to_string(), "openai:gpt-4o".to_string());
        map.insert(vars::MAX_SEARCH_RESULTS.to_string(), "3".to_string());

        let overrides = SettingsOverrides {
            model: Some("anthropic:claude-sonnet-4".to_string()),
            max_search_results: Some(12),
        };
        let settings = load(&map, &overrides).unwrap();

        assert_eq!(settings.model(), "anthropic:claude-sonnet-4");
        assert_eq!(settings.max_search_results(), 12);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let mut map = required();
        map.insert(vars::MODEL.to_string(), "openai:gpt-4o".to_string());
        map.insert(vars::OUTPUT_DIR.to_string(), "reports".to_string());
        map.insert(vars::ANTHROPIC_API_KEY.to_string(), "ak".to_string());
        map.insert(vars::MAX_AGENT_TURNS.to_string(), "25".to_string());

        let settings = load(&map, &SettingsOverrides::default()).unwrap();
        assert_eq!(settings.model(), "openai:gpt-4o");
        assert_eq!(settings.output_dir(), &PathBuf::from("reports"));
        assert_eq!(settings.anthropic_api_key().map(ApiKey::expose), Some("ak"));
        assert_eq!(settings.max_agent_turns(), 25);
    }

    #[test]
    fn test_max_agent_turns_out_of_range() {
        let mut map = required();
        map.insert(vars::MAX_AGENT_TURNS.to_string(), "0".to_string());
        assert!(load(&map, &SettingsOverrides::default()).is_err());
    }

    #[test]
    fn test_log_level_accepts_fixed_set() {
        for (raw, expected) in [
            ("DEBUG", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("Warning", LogLevel::Warning),
            ("ERROR", LogLevel::Error),
            ("CRITICAL", LogLevel::Critical),
        ] {
            let mut map = required();
            map.insert(vars::LOG_LEVEL.to_string(), raw.to_string());
            let settings = load(&map, &SettingsOverrides::default()).unwrap();
            assert_eq!(settings.log_level(), expected);
        }
    }

    #[test]
    fn test_log_level_rejects_unknown() {
        let mut map = required();
        map.insert(vars::LOG_LEVEL.to_string(), "TRACE".to_string());
        let err = load(&map, &SettingsOverrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("TRACE".to_string()));
    }

    #[test]
    fn test_api_key_is_redacted() {
        let settings = load(&required(), &SettingsOverrides::default()).unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("test-openai-key"));
        assert!(!debug.contains("test-tavily-key"));
        assert!(debug.contains("REDACTED"));
        assert_eq!(ApiKey::new("secret").to_string(), "[REDACTED]");
    }
}
