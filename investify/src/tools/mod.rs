//! Tools an agent may call through the completion client

pub mod research;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::UpstreamError;

pub use research::{ResearchClient, ResearchTool};

/// Function description offered to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Run the tool with the model-supplied arguments and return text for the model
    async fn call(&self, arguments: Value) -> Result<String, UpstreamError>;
}

/// Schema shared by the search tools: `{ "query": string }`
pub fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query to find information"
            }
        },
        "required": ["query"]
    })
}

/// Extract the non-empty `query` argument
pub fn query_argument(tool: &str, arguments: &Value) -> Result<String, UpstreamError> {
    arguments
        .get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::Tool {
            name: tool.to_string(),
            message: "missing string argument `query`".to_string(),
        })
}
