//! Investment agent: opportunity overview, market context, risk and return

use std::sync::Arc;

use super::PayloadStep;
use crate::tools::Tool;
use crate::types::{InvestmentMetrics, StepName};

pub const SYSTEM_PROMPT: &str =
    "You are an expert investment analyst helping evaluate potential investments.";

pub const PROMPT_TEMPLATE: &str = r#"
You are an expert investment analyst evaluating potential investments. Your task is to provide a comprehensive analysis of the investment opportunity, including market context, risk assessment, and growth potential.

Investment Content:
<INVESTMENT_CONTENT>

Instructions:
1. Provide a detailed investment analysis covering:

Investment Overview:
- Brief description of the investment opportunity
- Industry and sector categorization
- Stage of investment (early, growth, mature)

Market Analysis:
- Total Addressable Market (TAM) with specific dollar amounts
- Current market growth rate with percentage
- Major market drivers and headwinds
- Competitive landscape assessment

Risk Assessment:
- Key risk factors with likelihood and impact
- Potential mitigation strategies for identified risks
- Regulatory considerations
- Market timing considerations

Return Potential:
- Estimated ROI projections (short-term and long-term)
- Specific growth drivers with examples
- Exit strategy options
- Time horizon considerations

2. Important:
- Use the web_search tool when recent data would strengthen the analysis
- Provide specific numbers and data points whenever possible
- If information is estimated, clearly state your assumptions
- Note areas where additional research would be valuable

Format your response as JSON with the following structure:
{
  "analysis": "Detailed markdown analysis with sections and bullet points",
  "metrics": {
    "confidence_score": 0.7, // 0-1 scale
    "key_metrics": {
      "market_size": {
        "tam_usd": 5000000000, // in USD
        "growth_rate_percent": 12.5
      },
      "risk_assessment": {
        "overall_risk": "medium", // high, medium, low
        "key_risks": ["risk1", "risk2"]
      },
      "return_potential": {
        "estimated_roi_percent": 18.5,
        "time_horizon_years": 5
      }
    }
  }
}

Focus on providing actionable insights that would help investors make informed decisions."#;

pub type InvestmentStep = PayloadStep<InvestmentMetrics>;

/// Investment agent bound to the `web_search` tool
pub fn investment_step(web_search: Arc<dyn Tool>) -> InvestmentStep {
    PayloadStep::new(
        StepName::Investment,
        SYSTEM_PROMPT,
        PROMPT_TEMPLATE,
        vec![web_search],
    )
}
