//! Error types for steps, upstream calls and configuration

use std::time::Duration;
use thiserror::Error;

use crate::types::StepName;

/// Failure of an external completion or research call
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure (connect, TLS, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the remote API
    #[error("{service} API error: {status} - {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Remote API answered, but not in the expected format
    #[error("Invalid response format from {service} API: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    /// The model asked for a tool the request did not bind
    #[error("Tool '{0}' is not available to this agent")]
    UnknownTool(String),

    /// A bound tool failed
    #[error("Tool '{name}' failed: {message}")]
    Tool { name: String, message: String },

    /// The model kept calling tools past the configured limit
    #[error("Exceeded {0} tool-call rounds without a final answer")]
    ToolRoundsExceeded(usize),

    /// The call did not settle within the step time limit
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single analysis step
#[derive(Debug, Error)]
pub enum StepError {
    /// The step's precondition rejected the input; the completion call was not made
    #[error("Invalid input for {0} agent")]
    InvalidInput(StepName),

    /// The parsed output failed the step's sanity gate
    #[error("Invalid output from {0} agent")]
    InvalidOutput(StepName),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
