//! Runs the analysis agents for one investment description
//!
//! Upstream agents run in declared order (investment, founder, market), or
//! concurrently when configured. Each failure is isolated and recorded. Scoring
//! runs only when at least one upstream agent succeeded. `analyze` never fails:
//! the caller always gets a complete [`CombinedResult`].

use chrono::Utc;
use investify_sdk::AnalysisLog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::error::{StepError, UpstreamError};
use crate::logging::{elapsed_ms, StepLogger};
use crate::steps::{
    execute_step, founder_step, investment_step, market_step, AnalysisStep, FounderStep,
    InvestmentStep, MarketStep, ScoringInput, ScoringStep,
};
use crate::tools::{ResearchClient, ResearchTool, Tool};
use crate::types::{
    AgentResults, AnalysisMeta, AnalysisRequest, CombinedResult, StepName, StepOutcome,
};

/// Why scoring did not run although it was enabled
pub const NO_SUCCESS_REASON: &str = "No successful agent analyses available";

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Run the three upstream agents concurrently instead of one after another
    pub concurrent_upstream: bool,
    /// Limit for a single agent run; exceeding it fails that agent only
    pub step_timeout: Option<Duration>,
    /// Mirror events to stderr as `AnalysisLog` lines
    pub emit_events: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrent_upstream: false,
            step_timeout: None,
            emit_events: true,
        }
    }
}

/// Per-call options; every agent is enabled unless switched off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    pub request_id: Option<String>,
    pub run_investment: bool,
    pub run_founder: bool,
    pub run_market: bool,
    pub run_scoring: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            request_id: None,
            run_investment: true,
            run_founder: true,
            run_market: true,
            run_scoring: true,
        }
    }
}

impl AnalyzeOptions {
    pub fn is_enabled(&self, step: StepName) -> bool {
        match step {
            StepName::Investment => self.run_investment,
            StepName::Founder => self.run_founder,
            StepName::Market => self.run_market,
            StepName::Scoring => self.run_scoring,
        }
    }

    /// Enabled agents in execution order
    pub fn enabled_steps(&self) -> Vec<StepName> {
        StepName::UPSTREAM
            .into_iter()
            .chain([StepName::Scoring])
            .filter(|step| self.is_enabled(*step))
            .collect()
    }
}

/// `investment-<uuid v4>`
pub fn generate_request_id() -> String {
    format!("investment-{}", Uuid::new_v4())
}

/// Message appended to `errors` for a failed agent
pub fn step_error_message(step: StepName, message: &str) -> String {
    format!("{} agent error: {}", step.display_name(), message)
}

/// Message appended to `errors` when scoring had nothing to work with
pub fn scoring_skipped_message() -> String {
    format!("Scoring agent skipped: {NO_SUCCESS_REASON}")
}

/// Agents attempted and errors raised, both in the order they are recorded
#[derive(Debug, Default)]
struct RunLedger {
    agents_run: Vec<StepName>,
    errors: Vec<String>,
}

impl RunLedger {
    fn record<T>(&mut self, step: StepName, outcome: Option<&StepOutcome<T>>) {
        let Some(outcome) = outcome else {
            return;
        };
        self.agents_run.push(step);
        if let StepOutcome::Failure { message } = outcome {
            self.errors.push(step_error_message(step, message));
        }
    }
}

pub struct Orchestrator {
    client: Arc<dyn CompletionClient>,
    investment: InvestmentStep,
    founder: FounderStep,
    market: MarketStep,
    scoring: ScoringStep,
    config: OrchestratorConfig,
    events: broadcast::Sender<AnalysisLog>,
}

impl Orchestrator {
    /// Agents share one completion client; the search tools share one research client
    pub fn new(client: Arc<dyn CompletionClient>, research: Arc<ResearchClient>) -> Self {
        let web_search: Arc<dyn Tool> = Arc::new(ResearchTool::web_search(research.clone()));
        let perplexity: Arc<dyn Tool> = Arc::new(ResearchTool::perplexity(research));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            client,
            investment: investment_step(web_search),
            founder: founder_step(perplexity.clone()),
            market: market_step(perplexity),
            scoring: ScoringStep::new(),
            config: OrchestratorConfig::default(),
            events,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Receive every event of subsequent `analyze` calls
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisLog> {
        self.events.subscribe()
    }

    pub async fn analyze(&self, content: &str, options: AnalyzeOptions) -> CombinedResult {
        let started = Instant::now();
        let request_id = options
            .request_id
            .clone()
            .unwrap_or_else(generate_request_id);
        let request = AnalysisRequest::new(content, request_id.clone());
        let logger = StepLogger::new(
            request_id.clone(),
            self.events.clone(),
            self.config.emit_events,
        );
        logger.analysis_started(content.len(), &options.enabled_steps());

        let investment_run =
            self.run_if(options.run_investment, &self.investment, &request, &logger);
        let founder_run = self.run_if(options.run_founder, &self.founder, &request, &logger);
        let market_run = self.run_if(options.run_market, &self.market, &request, &logger);

        let (investment, founder, market) = if self.config.concurrent_upstream {
            futures::join!(investment_run, founder_run, market_run)
        } else {
            (investment_run.await, founder_run.await, market_run.await)
        };

        let mut ledger = RunLedger::default();
        ledger.record(StepName::Investment, investment.as_ref());
        ledger.record(StepName::Founder, founder.as_ref());
        ledger.record(StepName::Market, market.as_ref());

        let input = ScoringInput {
            request,
            agent_results: AgentResults {
                investment_analysis: investment,
                founder_analysis: founder,
                market_analysis: market,
            },
        };

        let scoring = if !options.run_scoring {
            None
        } else if input.agent_results.any_success() {
            let outcome = self.run_guarded(&self.scoring, &input, &logger).await;
            ledger.record(StepName::Scoring, Some(&outcome));
            outcome.into_data()
        } else {
            logger.step_skipped(StepName::Scoring, NO_SUCCESS_REASON);
            ledger.errors.push(scoring_skipped_message());
            None
        };

        let AgentResults {
            investment_analysis,
            founder_analysis,
            market_analysis,
        } = input.agent_results;

        let meta = AnalysisMeta {
            request_id,
            timestamp: Utc::now(),
            agents_run: ledger.agents_run,
            execution_time_ms: elapsed_ms(started),
        };
        logger.analysis_completed(&meta, ledger.errors.len());

        CombinedResult {
            investment: investment_analysis.and_then(StepOutcome::into_data),
            founder: founder_analysis.and_then(StepOutcome::into_data),
            market: market_analysis.and_then(StepOutcome::into_data),
            scoring,
            errors: ledger.errors,
            meta,
        }
    }

    async fn run_if<S: AnalysisStep>(
        &self,
        enabled: bool,
        step: &S,
        input: &S::Input,
        logger: &StepLogger,
    ) -> Option<StepOutcome<S::Output>> {
        if enabled {
            Some(self.run_guarded(step, input, logger).await)
        } else {
            None
        }
    }

    /// Run one step under the time limit and output gate, reporting the outcome
    async fn run_guarded<S: AnalysisStep>(
        &self,
        step: &S,
        input: &S::Input,
        logger: &StepLogger,
    ) -> StepOutcome<S::Output> {
        let name = step.name();
        let started = logger.step_started(name);
        let run = execute_step(step, self.client.as_ref(), input);

        let result = match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .unwrap_or_else(|_| Err(UpstreamError::Timeout(limit).into())),
            None => run.await,
        };

        let result = result.and_then(|output| {
            if step.validate_output(&output) {
                Ok(output)
            } else {
                Err(StepError::InvalidOutput(name))
            }
        });

        match result {
            Ok(data) => {
                logger.step_completed(name, started);
                StepOutcome::Success { data }
            }
            Err(e) => {
                let message = e.to_string();
                logger.step_failed(name, &message, started);
                StepOutcome::Failure { message }
            }
        }
    }
}
