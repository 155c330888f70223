//! Scoring agent: synthesizes the upstream analyses into scores and a recommendation

use std::sync::Arc;

use super::{substitute, AnalysisStep, CONTENT_PLACEHOLDER};
use crate::parser::parse_response;
use crate::tools::Tool;
use crate::types::{AgentResults, AnalysisRequest, ScoringResult, StepName};

/// Replaced by the pretty-printed successful upstream analyses
pub const RESULTS_PLACEHOLDER: &str = "<AGENT_RESULTS>";

pub const SYSTEM_PROMPT: &str = "You are an expert investment evaluator. Your task is to analyze \
investment opportunities based on multiple analyses and provide comprehensive scoring \
assessments.";

pub const PROMPT_TEMPLATE: &str = r#"
You are an expert investment evaluator. Your task is to analyze an investment opportunity based on previous agent analyses and provide a comprehensive scoring assessment.

Investment Content:
<INVESTMENT_CONTENT>

Previous Agent Analyses:
<AGENT_RESULTS>

Instructions:
1. Provide a comprehensive investment evaluation with the following sections:

Executive Summary:
- Overall assessment of the investment opportunity
- Overall score (0-100)
- Recommendation: "strong_consider", "consider", "needs_review", or "pass"
- Confidence level (0-1)
- Key highlights
- Key concerns

Team Analysis:
- Evaluation of the founding team's strengths and weaknesses
- Team score (0-100)
- Confidence level (0-1)

Market Analysis:
- Evaluation of market opportunity, timing and competitive landscape
- Market score (0-100)
- Confidence level (0-1)

Technical Analysis:
- Evaluation of the technical solution, its advantages and risks
- Technical score (0-100)
- Confidence level (0-1)

Innovation Assessment:
- Evaluation of uniqueness, defensibility and potential impact
- Innovation score (0-100)
- Confidence level (0-1)

2. Important:
- Base your evaluation primarily on the agent analyses provided
- For aspects not covered by the analyses, make reasonable inferences from the investment content
- Be specific about strengths and weaknesses

Format your response as JSON with the following structure:
{
  "scores": {
    "overall": 72, // 0-100
    "team": {
      "score": 80, // 0-100
      "confidence": 0.8, // 0-1
      "strengths": ["Experienced founders", "Strong technical background"],
      "weaknesses": ["Lacks marketing expertise"],
      "assessment": "The team has strong technical capabilities but needs marketing support."
    },
    "market": {
      "score": 75,
      "confidence": 0.9,
      "strengths": ["Large TAM", "Strong growth rate"],
      "weaknesses": ["Highly competitive"],
      "assessment": "The market opportunity is substantial but the competitive landscape is challenging."
    },
    "technical": {
      "score": 85,
      "confidence": 0.7,
      "strengths": ["Proprietary technology", "Multiple patents"],
      "weaknesses": ["Complex implementation"],
      "assessment": "The technical solution is innovative with strong IP protection."
    },
    "innovation": {
      "score": 65,
      "confidence": 0.6,
      "strengths": ["Novel approach", "Solves real problems"],
      "weaknesses": ["Similar solutions emerging"],
      "assessment": "The innovation is valuable but facing increased competition."
    }
  },
  "recommendation": "consider", // "strong_consider", "consider", "needs_review", "pass"
  "confidence_level": 0.75, // 0-1
  "key_insights": [
    "Strong founding team with relevant experience",
    "Large addressable market with healthy growth rate"
  ],
  "risk_factors": [
    "Competitive market landscape",
    "Execution challenges in scaling"
  ]
}

Focus on providing actionable insights for investment decision making."#;

/// Request plus the recorded outcomes of the upstream agents
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub request: AnalysisRequest,
    pub agent_results: AgentResults,
}

pub struct ScoringStep {
    tools: Vec<Arc<dyn Tool>>,
}

impl ScoringStep {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }
}

impl Default for ScoringStep {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisStep for ScoringStep {
    type Input = ScoringInput;
    type Output = ScoringResult;

    fn name(&self) -> StepName {
        StepName::Scoring
    }

    fn system_prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    fn validate(&self, input: &ScoringInput) -> bool {
        !input.request.content.is_empty() && input.agent_results.any_success()
    }

    /// Results go in first so that content containing a placeholder is left alone
    fn render_prompt(&self, input: &ScoringInput) -> String {
        let view = input.agent_results.successful_view();
        let results = serde_json::to_string_pretty(&view).unwrap_or_default();
        let prompt = substitute(PROMPT_TEMPLATE, RESULTS_PLACEHOLDER, &results);
        substitute(&prompt, CONTENT_PLACEHOLDER, &input.request.content)
    }

    fn parse(&self, raw: &str) -> ScoringResult {
        let mut result: ScoringResult = parse_response(raw);
        result.clamp();
        result
    }

    fn validate_output(&self, output: &ScoringResult) -> bool {
        output.in_range()
    }
}
