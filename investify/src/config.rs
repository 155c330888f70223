//! Environment-driven configuration for the completion and research clients

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-1106-preview";
pub const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar-reasoning-pro";

/// Settings for the chat-completion client used by every agent
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP timeout for a single request
    pub timeout: Duration,
    /// Tool-call rounds allowed before giving up on a final answer
    pub max_tool_rounds: usize,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 4000,
            timeout: Duration::from_secs(120),
            max_tool_rounds: 5,
        }
    }

    /// Read `OPENAI_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = non_empty(lookup);
        let api_key = lookup("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
        let defaults = Self::new(api_key);

        Ok(Self {
            base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature: parse_var(&lookup, "OPENAI_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_var(&lookup, "OPENAI_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(parse_var(
                &lookup,
                "OPENAI_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            ..defaults
        })
    }
}

/// Settings for the Perplexity research tool
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchConfig {
    /// Without a key the research client answers from canned offline summaries
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PERPLEXITY_BASE_URL.to_string(),
            model: DEFAULT_PERPLEXITY_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

impl ResearchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = non_empty(lookup);
        let defaults = Self::default();

        Self {
            api_key: lookup("PERPLEXITY_API_KEY"),
            base_url: lookup("PERPLEXITY_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("PERPLEXITY_MODEL").unwrap_or(defaults.model),
            ..defaults
        }
    }

    pub fn is_offline(&self) -> bool {
        self.api_key.is_none()
    }
}

fn non_empty(lookup: impl Fn(&str) -> Option<String>) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
