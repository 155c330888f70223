//! Concurrent upstream execution and per-agent time limits

use super::common::*;
use investify::{AnalyzeOptions, OrchestratorConfig, StepName};
use investify_sdk::AnalysisLog;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn concurrent() -> OrchestratorConfig {
    OrchestratorConfig {
        concurrent_upstream: true,
        ..Default::default()
    }
}

fn completion_order(events: &[AnalysisLog]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            AnalysisLog::StepCompleted { step, .. } => Some(step.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_concurrent_results_keep_declared_order() {
    let client = Arc::new(
        all_succeeding()
            .delayed(
                StepName::Investment,
                Duration::from_millis(150),
                payload_reply("Investment looks sound", 0.7),
            )
            .delayed(
                StepName::Founder,
                Duration::from_millis(75),
                payload_reply("Experienced founders", 0.8),
            ),
    );
    let orchestrator = orchestrator_with(&client, concurrent());
    let mut rx = orchestrator.subscribe();

    let result = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;
    let events = drain(&mut rx);

    assert_eq!(
        completion_order(&events),
        vec!["market", "founder", "investment", "scoring"]
    );
    assert_eq!(
        result.meta.agents_run,
        vec![
            StepName::Investment,
            StepName::Founder,
            StepName::Market,
            StepName::Scoring
        ]
    );
    assert!(result.errors.is_empty());
    assert_eq!(result.investment.unwrap().narrative, "Investment looks sound");
}

#[tokio::test]
async fn test_concurrent_errors_keep_declared_order() {
    let client = Arc::new(
        all_succeeding()
            .delayed(
                StepName::Investment,
                Duration::from_millis(500),
                payload_reply("Too slow", 0.7),
            )
            .fail(StepName::Market, "rate limited"),
    );
    let orchestrator = orchestrator_with(
        &client,
        OrchestratorConfig {
            step_timeout: Some(Duration::from_millis(100)),
            ..concurrent()
        },
    );

    let result = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;

    assert_eq!(
        result.errors,
        vec![
            "Investment agent error: Timed out after 100ms",
            "Market agent error: rate limited",
        ]
    );
    assert!(result.founder.is_some());
    assert!(result.scoring.is_some());
}

#[tokio::test]
async fn test_upstream_agents_overlap_when_concurrent() {
    let delay = Duration::from_millis(300);
    let client = Arc::new(
        all_succeeding()
            .delayed(StepName::Investment, delay, payload_reply("a", 0.5))
            .delayed(StepName::Founder, delay, payload_reply("b", 0.5))
            .delayed(StepName::Market, delay, payload_reply("c", 0.5)),
    );
    let orchestrator = orchestrator_with(&client, concurrent());

    let started = Instant::now();
    let result = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;
    let elapsed = started.elapsed();

    assert!(result.errors.is_empty());
    assert!(
        elapsed < delay * 3,
        "upstream agents ran one after another: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_timeout_fails_only_the_slow_agent() {
    let client = Arc::new(all_succeeding().delayed(
        StepName::Investment,
        Duration::from_millis(500),
        payload_reply("Too slow", 0.7),
    ));
    let orchestrator = orchestrator_with(
        &client,
        OrchestratorConfig {
            step_timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        },
    );

    let result = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;

    assert_eq!(
        result.errors,
        vec!["Investment agent error: Timed out after 50ms"]
    );
    assert!(result.investment.is_none());
    assert!(result.founder.is_some());
    assert!(result.market.is_some());
    assert!(result.scoring.is_some());
    assert_eq!(result.meta.agents_run.len(), 4);
}
