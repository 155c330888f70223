//! Events published to subscribers during an analysis

use super::common::*;
use investify::{AnalyzeOptions, StepName};
use investify_sdk::AnalysisLog;
use std::sync::Arc;

fn step_of(event: &AnalysisLog) -> Option<&str> {
    match event {
        AnalysisLog::StepStarted { step, .. }
        | AnalysisLog::StepCompleted { step, .. }
        | AnalysisLog::StepFailed { step, .. }
        | AnalysisLog::StepSkipped { step, .. } => Some(step.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn test_successful_run_event_sequence() {
    let client = Arc::new(all_succeeding());
    let orchestrator = orchestrator(&client);
    let mut rx = orchestrator.subscribe();

    let options = AnalyzeOptions {
        request_id: Some("req-events".to_string()),
        ..Default::default()
    };
    let result = orchestrator.analyze(CONTENT, options).await;
    let events = drain(&mut rx);

    match events.first() {
        Some(AnalysisLog::AnalysisStarted {
            request_id,
            content_length,
            steps,
            ..
        }) => {
            assert_eq!(request_id, "req-events");
            assert_eq!(*content_length, CONTENT.len());
            assert_eq!(steps, &["investment", "founder", "market", "scoring"]);
        }
        other => panic!("expected AnalysisStarted first, got {other:?}"),
    }

    match events.last() {
        Some(AnalysisLog::AnalysisCompleted {
            agents_run,
            error_count,
            execution_time_ms,
            ..
        }) => {
            assert_eq!(agents_run.len(), 4);
            assert_eq!(*error_count, 0);
            assert_eq!(*execution_time_ms, result.meta.execution_time_ms);
        }
        other => panic!("expected AnalysisCompleted last, got {other:?}"),
    }

    let completed: Vec<&str> = events
        .iter()
        .filter(|e| matches!(e, AnalysisLog::StepCompleted { .. }))
        .filter_map(step_of)
        .collect();
    assert_eq!(completed, vec!["investment", "founder", "market", "scoring"]);
    assert!(events
        .iter()
        .all(|e| !matches!(e, AnalysisLog::StepFailed { .. })));
}

#[tokio::test]
async fn test_failure_and_skip_events() {
    let client = Arc::new(ScriptedClient::new());
    let orchestrator = orchestrator(&client);
    let mut rx = orchestrator.subscribe();

    let result = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;
    let events = drain(&mut rx);

    let failed: Vec<(&str, &str)> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisLog::StepFailed { step, error, .. } => Some((step.as_str(), error.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        failed,
        vec![
            ("investment", "no scripted reply for investment"),
            ("founder", "no scripted reply for founder"),
            ("market", "no scripted reply for market"),
        ]
    );

    assert!(events.iter().any(|e| matches!(
        e,
        AnalysisLog::StepSkipped { step, reason, .. }
            if step == "scoring" && reason == "No successful agent analyses available"
    )));

    match events.last() {
        Some(AnalysisLog::AnalysisCompleted { error_count, .. }) => {
            assert_eq!(*error_count, 4);
            assert_eq!(*error_count, result.errors.len());
        }
        other => panic!("expected AnalysisCompleted last, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disabled_agents_emit_no_step_events() {
    let client = Arc::new(all_succeeding());
    let orchestrator = orchestrator(&client);
    let mut rx = orchestrator.subscribe();

    let options = AnalyzeOptions {
        run_investment: false,
        run_scoring: false,
        ..Default::default()
    };
    orchestrator.analyze(CONTENT, options).await;
    let events = drain(&mut rx);

    let steps: Vec<&str> = events.iter().filter_map(step_of).collect();
    assert!(!steps.contains(&StepName::Investment.as_str()));
    assert!(!steps.contains(&StepName::Scoring.as_str()));
    assert_eq!(
        steps,
        vec!["founder", "founder", "market", "market"],
        "each enabled agent starts then completes"
    );
}

#[tokio::test]
async fn test_events_are_tagged_with_the_request_id() {
    let client = Arc::new(all_succeeding().fail(StepName::Market, "boom"));
    let orchestrator = orchestrator(&client);
    let mut rx = orchestrator.subscribe();

    let options = AnalyzeOptions {
        request_id: Some("req-tagged".to_string()),
        ..Default::default()
    };
    orchestrator.analyze(CONTENT, options).await;

    let events = drain(&mut rx);
    assert!(!events.is_empty());
    for event in &events {
        let line = event.to_line().unwrap();
        assert!(line.contains("\"request_id\":\"req-tagged\""), "{line}");
    }
}
