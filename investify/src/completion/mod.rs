//! Chat-completion boundary used by every analysis step

pub mod openai;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::UpstreamError;
use crate::tools::Tool;
use crate::types::StepName;

pub use openai::OpenAiClient;

/// One completion call made on behalf of an agent
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub agent: StepName,
    pub system_prompt: &'a str,
    pub prompt: &'a str,
    /// Tools the model may call before answering
    pub tools: &'a [Arc<dyn Tool>],
}

impl CompletionRequest<'_> {
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.spec().name).collect()
    }
}

impl fmt::Debug for CompletionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("agent", &self.agent)
            .field("prompt_len", &self.prompt.len())
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Sends a prompt to a language model and returns its final text reply
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, UpstreamError>;
}
