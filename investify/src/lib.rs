//! Multi-agent investment analysis
//!
//! An investment description is sent to three independent analysis agents
//! (investment, founder, market). Their successful outputs feed a scoring agent
//! that synthesizes a recommendation. The [`Orchestrator`] isolates each
//! agent's failure and always returns a complete [`CombinedResult`].

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
mod lenient;
pub mod logging;
pub mod orchestrator;
pub mod parser;
pub mod steps;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use completion::{CompletionClient, CompletionRequest, OpenAiClient};
pub use config::{LlmConfig, ResearchConfig};
pub use error::{ConfigError, StepError, UpstreamError};
pub use orchestrator::{AnalyzeOptions, Orchestrator, OrchestratorConfig};
pub use tools::{ResearchClient, ResearchTool, Tool, ToolSpec};
pub use types::{
    AgentResults, AnalysisMeta, AnalysisPayload, AnalysisRequest, CategoryScore, CombinedResult,
    FounderAnalysis, InvestmentAnalysis, Level, MarketAnalysis, MarketStage, Recommendation,
    ScoringResult, StepName, StepOutcome,
};
