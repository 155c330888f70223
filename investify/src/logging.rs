//! Step-level event logging for one orchestration call
//!
//! [`StepLogger`] is the only place the orchestrator reports progress. Every
//! event is published on the orchestrator's broadcast channel and, when enabled,
//! written to stderr as an `AnalysisLog` line.

use investify_sdk::AnalysisLog;
use std::time::Instant;
use tokio::sync::broadcast;

use crate::types::{AnalysisMeta, StepName};

pub struct StepLogger {
    request_id: String,
    events: broadcast::Sender<AnalysisLog>,
    emit: bool,
}

impl StepLogger {
    pub fn new(
        request_id: impl Into<String>,
        events: broadcast::Sender<AnalysisLog>,
        emit: bool,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            events,
            emit,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    fn publish(&self, event: AnalysisLog) {
        if self.emit {
            event.emit();
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn analysis_started(&self, content_length: usize, steps: &[StepName]) {
        self.publish(AnalysisLog::AnalysisStarted {
            request_id: self.request_id.clone(),
            content_length,
            steps: steps.iter().map(|s| s.to_string()).collect(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// Returns the start instant to pass back to `step_completed` / `step_failed`
    pub fn step_started(&self, step: StepName) -> Instant {
        self.publish(AnalysisLog::StepStarted {
            request_id: self.request_id.clone(),
            step: step.to_string(),
        });
        Instant::now()
    }

    pub fn step_completed(&self, step: StepName, started: Instant) {
        self.publish(AnalysisLog::StepCompleted {
            request_id: self.request_id.clone(),
            step: step.to_string(),
            elapsed_ms: elapsed_ms(started),
        });
    }

    pub fn step_failed(&self, step: StepName, error: &str, started: Instant) {
        self.publish(AnalysisLog::StepFailed {
            request_id: self.request_id.clone(),
            step: step.to_string(),
            error: error.to_string(),
            elapsed_ms: elapsed_ms(started),
        });
    }

    pub fn step_skipped(&self, step: StepName, reason: &str) {
        self.publish(AnalysisLog::StepSkipped {
            request_id: self.request_id.clone(),
            step: step.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn analysis_completed(&self, meta: &AnalysisMeta, error_count: usize) {
        self.publish(AnalysisLog::AnalysisCompleted {
            request_id: self.request_id.clone(),
            agents_run: meta.agents_run.iter().map(|s| s.to_string()).collect(),
            error_count,
            execution_time_ms: meta.execution_time_ms,
            timestamp: meta.timestamp,
        });
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
