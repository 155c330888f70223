//! Common test utilities for orchestrator tests

use async_trait::async_trait;
use investify::completion::{CompletionClient, CompletionRequest};
use investify::{Orchestrator, OrchestratorConfig, ResearchClient, StepName, UpstreamError};
use investify_sdk::AnalysisLog;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// What the scripted client answers for one agent
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Delayed(Duration, String),
}

/// One completion request as seen by the client
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub agent: StepName,
    pub prompt: String,
    pub tools: Vec<String>,
}

/// Completion client answering from a per-agent script and recording every request
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<StepName, Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, agent: StepName, text: impl Into<String>) -> Self {
        self.script(agent, Reply::Text(text.into()))
    }

    pub fn fail(self, agent: StepName, message: impl Into<String>) -> Self {
        self.script(agent, Reply::Fail(message.into()))
    }

    pub fn delayed(self, agent: StepName, delay: Duration, text: impl Into<String>) -> Self {
        self.script(agent, Reply::Delayed(delay, text.into()))
    }

    fn script(self, agent: StepName, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(agent, reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn agents_called(&self) -> Vec<StepName> {
        self.calls().into_iter().map(|call| call.agent).collect()
    }

    pub fn prompt_for(&self, agent: StepName) -> Option<String> {
        self.calls()
            .into_iter()
            .find(|call| call.agent == agent)
            .map(|call| call.prompt)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(RecordedCall {
            agent: request.agent,
            prompt: request.prompt.to_string(),
            tools: request.tool_names(),
        });

        let reply = self.replies.lock().unwrap().get(&request.agent).cloned();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(UpstreamError::Other(message)),
            Some(Reply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(UpstreamError::Other(format!(
                "no scripted reply for {}",
                request.agent
            ))),
        }
    }
}

/// Orchestrator over `client` with stderr events switched off
pub fn orchestrator(client: &Arc<ScriptedClient>) -> Orchestrator {
    orchestrator_with(client, OrchestratorConfig::default())
}

pub fn orchestrator_with(client: &Arc<ScriptedClient>, config: OrchestratorConfig) -> Orchestrator {
    Orchestrator::new(client.clone(), Arc::new(ResearchClient::offline())).with_config(
        OrchestratorConfig {
            emit_events: false,
            ..config
        },
    )
}

/// Fenced JSON reply for an upstream agent
pub fn payload_reply(narrative: &str, confidence: f64) -> String {
    format!(
        "Here is my analysis.\n```json\n{{\"analysis\": \"{narrative}\", \"metrics\": {{\"confidence_score\": {confidence}}}}}\n```"
    )
}

/// Fenced JSON reply for the scoring agent
pub fn scoring_reply(overall: f64, recommendation: &str) -> String {
    format!(
        r#"```json
{{
  "scores": {{"overall": {overall}}},
  "recommendation": "{recommendation}",
  "confidence_level": 0.8,
  "key_insights": ["Strong team"],
  "risk_factors": ["Crowded market"]
}}
```"#
    )
}

/// Client where every agent succeeds
pub fn all_succeeding() -> ScriptedClient {
    ScriptedClient::new()
        .reply(StepName::Investment, payload_reply("Investment looks sound", 0.7))
        .reply(StepName::Founder, payload_reply("Experienced founders", 0.8))
        .reply(StepName::Market, payload_reply("Large growing market", 0.6))
        .reply(StepName::Scoring, scoring_reply(72.0, "consider"))
}

/// Drain every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<AnalysisLog>) -> Vec<AnalysisLog> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub const CONTENT: &str = "Acme Robotics is raising a $5M seed round to build warehouse robots.";
