//! Failure isolation: one agent's failure never halts the others

use super::common::*;
use investify::{AnalyzeOptions, StepName};
use std::sync::Arc;

#[tokio::test]
async fn test_all_agents_succeed() {
    let client = Arc::new(all_succeeding());
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(
        result.investment.as_ref().unwrap().narrative,
        "Investment looks sound"
    );
    assert_eq!(result.founder.as_ref().unwrap().metrics.confidence_score, 0.8);
    assert!(result.market.is_some());
    assert_eq!(result.scoring.as_ref().unwrap().scores.overall, 72.0);
    assert_eq!(
        result.meta.agents_run,
        vec![
            StepName::Investment,
            StepName::Founder,
            StepName::Market,
            StepName::Scoring
        ]
    );
    assert_eq!(client.agents_called(), result.meta.agents_run);
}

#[tokio::test]
async fn test_empty_content_rejected_by_every_agent() {
    let client = Arc::new(all_succeeding());
    let result = orchestrator(&client)
        .analyze("", AnalyzeOptions::default())
        .await;

    assert!(result.investment.is_none());
    assert!(result.founder.is_none());
    assert!(result.market.is_none());
    assert!(result.scoring.is_none());
    assert_eq!(
        result.errors,
        vec![
            "Investment agent error: Invalid input for investment agent",
            "Founder agent error: Invalid input for founder agent",
            "Market agent error: Invalid input for market agent",
            "Scoring agent skipped: No successful agent analyses available",
        ]
    );
    assert_eq!(
        result.meta.agents_run,
        vec![StepName::Investment, StepName::Founder, StepName::Market]
    );
    assert!(client.calls().is_empty(), "no completion call may be made");
}

#[tokio::test]
async fn test_all_upstream_failures_skip_scoring() {
    let client = Arc::new(
        ScriptedClient::new()
            .fail(StepName::Investment, "OpenAI API error: 500 - upstream down")
            .fail(StepName::Founder, "connection reset")
            .fail(StepName::Market, "rate limited")
            .reply(StepName::Scoring, scoring_reply(90.0, "strong_consider")),
    );
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert_eq!(
        result.errors,
        vec![
            "Investment agent error: OpenAI API error: 500 - upstream down",
            "Founder agent error: connection reset",
            "Market agent error: rate limited",
            "Scoring agent skipped: No successful agent analyses available",
        ]
    );
    assert!(result.scoring.is_none());
    assert!(!client.agents_called().contains(&StepName::Scoring));
    assert!(!result.meta.agents_run.contains(&StepName::Scoring));
}

#[tokio::test]
async fn test_middle_failure_does_not_halt_later_agents() {
    let client = Arc::new(all_succeeding().fail(StepName::Founder, "timeout talking to model"));
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert_eq!(
        result.errors,
        vec!["Founder agent error: timeout talking to model"]
    );
    assert!(result.investment.is_some());
    assert!(result.founder.is_none());
    assert!(result.market.is_some());
    assert!(result.scoring.is_some());
    assert_eq!(result.meta.agents_run.len(), 4);
}

#[tokio::test]
async fn test_disabled_agents_are_not_attempted() {
    let client = Arc::new(all_succeeding());
    let options = AnalyzeOptions {
        run_founder: false,
        run_scoring: false,
        ..Default::default()
    };
    let result = orchestrator(&client).analyze(CONTENT, options).await;

    assert_eq!(
        result.meta.agents_run,
        vec![StepName::Investment, StepName::Market]
    );
    assert_eq!(
        client.agents_called(),
        vec![StepName::Investment, StepName::Market]
    );
    assert!(result.founder.is_none());
    assert!(result.scoring.is_none());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_disabled_scoring_adds_no_skip_message() {
    let client = Arc::new(ScriptedClient::new());
    let options = AnalyzeOptions {
        run_scoring: false,
        ..Default::default()
    };
    let result = orchestrator(&client).analyze(CONTENT, options).await;

    assert_eq!(result.errors.len(), 3);
    assert!(result
        .errors
        .iter()
        .all(|e| e.contains("no scripted reply")));
}

#[tokio::test]
async fn test_empty_narrative_is_a_success() {
    let client = Arc::new(
        ScriptedClient::new()
            .reply(
                StepName::Investment,
                "```json\n{\"analysis\": \"\", \"metrics\": {\"confidence_score\": 0.6}}\n```",
            )
            .reply(StepName::Scoring, scoring_reply(55.0, "needs_review")),
    );
    let options = AnalyzeOptions {
        run_founder: false,
        run_market: false,
        ..Default::default()
    };
    let result = orchestrator(&client).analyze(CONTENT, options).await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    let investment = result.investment.unwrap();
    assert_eq!(investment.narrative, "");
    assert_eq!(investment.metrics.confidence_score, 0.6);
    assert!(result.scoring.is_some(), "an empty narrative still enables scoring");
}

#[tokio::test]
async fn test_prose_replies_degrade_to_defaults() {
    let client = Arc::new(
        all_succeeding()
            .reply(StepName::Market, "The market is large but fragmented.")
            .reply(StepName::Scoring, "After review.\nOverall score: 150\nThanks."),
    );
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert!(result.errors.is_empty());
    let market = result.market.unwrap();
    assert_eq!(market.narrative, "The market is large but fragmented.");
    assert_eq!(market.metrics.confidence_score, 0.5);

    let scoring = result.scoring.unwrap();
    assert_eq!(scoring.scores.overall, 100.0);
    assert_eq!(scoring.recommendation, investify::Recommendation::NeedsReview);
}

#[tokio::test]
async fn test_request_id_given_or_generated() {
    let client = Arc::new(all_succeeding());
    let orchestrator = orchestrator(&client);

    let given = orchestrator
        .analyze(
            CONTENT,
            AnalyzeOptions {
                request_id: Some("deal-42".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(given.meta.request_id, "deal-42");

    let generated = orchestrator.analyze(CONTENT, AnalyzeOptions::default()).await;
    assert!(generated.meta.request_id.starts_with("investment-"));
    assert_ne!(generated.meta.request_id, given.meta.request_id);
}
