//! Scoring gate, scoring input and tool binding

use super::common::*;
use investify::{AnalyzeOptions, Recommendation, StepName};
use std::sync::Arc;

#[tokio::test]
async fn test_scoring_sees_only_successful_analyses() {
    let client = Arc::new(
        all_succeeding()
            .fail(StepName::Investment, "boom")
            .fail(StepName::Founder, "boom"),
    );
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert!(result.scoring.is_some());
    let prompt = client.prompt_for(StepName::Scoring).unwrap();
    assert!(prompt.contains("\"market_analysis\""));
    assert!(prompt.contains("Large growing market"));
    assert!(!prompt.contains("\"investment_analysis\""));
    assert!(!prompt.contains("\"founder_analysis\""));
    assert!(prompt.contains(CONTENT));
}

#[tokio::test]
async fn test_scoring_runs_when_only_one_agent_enabled() {
    let client = Arc::new(all_succeeding());
    let options = AnalyzeOptions {
        run_investment: false,
        run_market: false,
        ..Default::default()
    };
    let result = orchestrator(&client).analyze(CONTENT, options).await;

    assert_eq!(
        result.meta.agents_run,
        vec![StepName::Founder, StepName::Scoring]
    );
    let scoring = result.scoring.unwrap();
    assert_eq!(scoring.recommendation, Recommendation::Consider);
    assert_eq!(scoring.key_insights, vec!["Strong team"]);
    assert_eq!(scoring.risk_factors, vec!["Crowded market"]);
}

#[tokio::test]
async fn test_out_of_range_scores_are_clamped() {
    let client = Arc::new(all_succeeding().reply(
        StepName::Scoring,
        r#"```json
{
  "scores": {"overall": 140, "team": {"score": -20, "confidence": 3}},
  "recommendation": "strong_consider",
  "confidence_level": 1.7,
  "key_insights": [],
  "risk_factors": []
}
```"#,
    ));
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    let scoring = result.scoring.unwrap();
    assert_eq!(scoring.scores.overall, 100.0);
    assert_eq!(scoring.scores.team.score, 0.0);
    assert_eq!(scoring.scores.team.confidence, 1.0);
    assert_eq!(scoring.confidence_level, 1.0);
    assert_eq!(scoring.recommendation, Recommendation::StrongConsider);
}

#[tokio::test]
async fn test_scoring_failure_is_recorded() {
    let client = Arc::new(all_succeeding().fail(StepName::Scoring, "context length exceeded"));
    let result = orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    assert!(result.scoring.is_none());
    assert!(result.investment.is_some());
    assert_eq!(
        result.errors,
        vec!["Scoring agent error: context length exceeded"]
    );
    assert_eq!(result.meta.agents_run.last(), Some(&StepName::Scoring));
}

#[tokio::test]
async fn test_agents_are_bound_to_their_tools() {
    let client = Arc::new(all_succeeding());
    orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    let tools: Vec<(StepName, Vec<String>)> = client
        .calls()
        .into_iter()
        .map(|call| (call.agent, call.tools))
        .collect();
    assert_eq!(
        tools,
        vec![
            (StepName::Investment, vec!["web_search".to_string()]),
            (StepName::Founder, vec!["perplexity".to_string()]),
            (StepName::Market, vec!["perplexity".to_string()]),
            (StepName::Scoring, vec![]),
        ]
    );
}

#[tokio::test]
async fn test_every_upstream_prompt_carries_the_content() {
    let client = Arc::new(all_succeeding());
    orchestrator(&client)
        .analyze(CONTENT, AnalyzeOptions::default())
        .await;

    for agent in StepName::UPSTREAM {
        let prompt = client.prompt_for(agent).unwrap();
        assert!(prompt.contains(CONTENT), "{agent} prompt lacks the content");
    }
}
