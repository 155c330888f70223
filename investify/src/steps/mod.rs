//! Analysis steps
//!
//! Every agent is a value implementing [`AnalysisStep`]: a prompt template, the
//! tools it may call, an input precondition, a parser and an output gate.
//! [`execute_step`] runs any of them against a [`CompletionClient`].
//!
//! The investment, founder and market agents differ only in prompt, tools and
//! metrics shape, so they share [`PayloadStep`]. Scoring has its own input.

pub mod founder;
pub mod investment;
pub mod market;
pub mod scoring;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::StepError;
use crate::parser::parse_response;
use crate::tools::Tool;
use crate::types::{AnalysisPayload, AnalysisRequest, StepMetrics, StepName};

pub use founder::{founder_step, FounderStep};
pub use investment::{investment_step, InvestmentStep};
pub use market::{market_step, MarketStep};
pub use scoring::{ScoringInput, ScoringStep};

/// Replaced by the investment description in every template
pub const CONTENT_PLACEHOLDER: &str = "<INVESTMENT_CONTENT>";

pub trait AnalysisStep: Send + Sync {
    type Input: Sync;
    type Output: Send;

    fn name(&self) -> StepName;

    fn system_prompt(&self) -> &str;

    fn tools(&self) -> &[Arc<dyn Tool>];

    /// Precondition checked before any completion call
    fn validate(&self, input: &Self::Input) -> bool;

    fn render_prompt(&self, input: &Self::Input) -> String;

    /// Total: malformed replies degrade to defaults, never to errors
    fn parse(&self, raw: &str) -> Self::Output;

    /// Sanity gate applied by the orchestrator after a successful run
    fn validate_output(&self, output: &Self::Output) -> bool;
}

/// Validate, render, complete and parse one step
pub async fn execute_step<S>(
    step: &S,
    client: &dyn CompletionClient,
    input: &S::Input,
) -> Result<S::Output, StepError>
where
    S: AnalysisStep + ?Sized,
{
    if !step.validate(input) {
        return Err(StepError::InvalidInput(step.name()));
    }

    let prompt = step.render_prompt(input);
    let raw = client
        .complete(CompletionRequest {
            agent: step.name(),
            system_prompt: step.system_prompt(),
            prompt: &prompt,
            tools: step.tools(),
        })
        .await?;

    Ok(step.parse(&raw))
}

/// Literal replacement of the first occurrence of `placeholder`
pub fn substitute(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

/// Upstream agent producing an [`AnalysisPayload`] from the raw request
pub struct PayloadStep<M> {
    name: StepName,
    system_prompt: &'static str,
    template: &'static str,
    tools: Vec<Arc<dyn Tool>>,
    metrics: PhantomData<fn() -> M>,
}

impl<M> PayloadStep<M> {
    pub fn new(
        name: StepName,
        system_prompt: &'static str,
        template: &'static str,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        Self {
            name,
            system_prompt,
            template,
            tools,
            metrics: PhantomData,
        }
    }
}

impl<M: StepMetrics> AnalysisStep for PayloadStep<M> {
    type Input = AnalysisRequest;
    type Output = AnalysisPayload<M>;

    fn name(&self) -> StepName {
        self.name
    }

    fn system_prompt(&self) -> &str {
        self.system_prompt
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    fn validate(&self, input: &AnalysisRequest) -> bool {
        !input.content.is_empty()
    }

    fn render_prompt(&self, input: &AnalysisRequest) -> String {
        substitute(self.template, CONTENT_PLACEHOLDER, &input.content)
    }

    fn parse(&self, raw: &str) -> AnalysisPayload<M> {
        let mut payload: AnalysisPayload<M> = parse_response(raw);
        payload.metrics.clamp();
        payload
    }

    /// Any decoded narrative counts as text, blank included
    fn validate_output(&self, output: &AnalysisPayload<M>) -> bool {
        (0.0..=1.0).contains(&output.metrics.confidence())
    }
}
