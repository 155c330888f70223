//! Founder agent: team composition, leadership and execution capability

use std::sync::Arc;

use super::PayloadStep;
use crate::tools::Tool;
use crate::types::{FounderMetrics, StepName};

pub const SYSTEM_PROMPT: &str = "You are an expert at analyzing founding teams and leadership \
for investment opportunities. Research team members to verify their backgrounds and provide \
comprehensive team assessments.";

pub const PROMPT_TEMPLATE: &str = r#"
You are an expert at analyzing founding teams and leadership for investment opportunities. Your task is to provide a comprehensive assessment of the team's capabilities, experience, and fit for the venture.

Investment Content:
<INVESTMENT_CONTENT>

Instructions:
1. Provide a detailed team assessment covering:

Team Composition:
- Identify key team members, their roles, and backgrounds
- Evaluate team size and structure
- Assess diversity of skills and perspectives within the team

Leadership Analysis:
- Evaluate founders' experience and track record
- Assess domain expertise and industry knowledge
- Analyze previous entrepreneurial successes or failures

Technical Capability:
- Assess technical expertise relevant to the venture
- Identify any critical technical skill gaps

Business Experience:
- Analyze business acumen and commercial experience
- Assess sales, marketing and financial management capabilities

Team Dynamics:
- Assess how long the team has worked together
- Evaluate complementary skills among team members
- Identify potential organizational challenges

2. Important:
- Use the perplexity tool to verify team members' backgrounds
- Provide specific examples to support your assessments
- Identify both strengths and weaknesses
- Note areas where additional team members or advisors would be valuable

Format your response as JSON with the following structure:
{
  "analysis": "Detailed markdown analysis with sections and bullet points",
  "metrics": {
    "confidence_score": 0.7, // 0-1 scale
    "key_metrics": {
      "team_size": 5, // number of core team members
      "technical_expertise_level": "high", // high, medium, low
      "business_expertise_level": "medium", // high, medium, low
      "industry_experience_years": 8, // average years in industry
      "previous_ventures": 2, // number of previous startups
      "team_completeness": 75, // 0-100 score
      "risk_level": "medium" // high, medium, low
    }
  }
}

Focus on providing actionable insights about the team's ability to execute on their business plan."#;

pub type FounderStep = PayloadStep<FounderMetrics>;

/// Founder agent bound to the `perplexity` tool
pub fn founder_step(perplexity: Arc<dyn Tool>) -> FounderStep {
    PayloadStep::new(
        StepName::Founder,
        SYSTEM_PROMPT,
        PROMPT_TEMPLATE,
        vec![perplexity],
    )
}
