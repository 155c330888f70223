//! Market agent: market size, competition and growth dynamics

use std::sync::Arc;

use super::PayloadStep;
use crate::tools::Tool;
use crate::types::{MarketMetrics, StepName};

pub const SYSTEM_PROMPT: &str = "You are an expert market analyst evaluating investment \
opportunities. Your task is to analyze markets, assess competition, and identify growth \
potential. Use research tools when specific market data is needed.";

pub const PROMPT_TEMPLATE: &str = r#"
You are an expert market analyst evaluating an investment opportunity. Your task is to provide a comprehensive analysis of the market opportunity, competitive landscape, and growth potential.

Investment Content:
<INVESTMENT_CONTENT>

Instructions:
1. Provide a detailed market analysis covering:

Market Size Analysis:
- Total Addressable Market (TAM) with specific dollar amounts
- Serviceable Addressable Market (SAM) with specific dollar amounts
- Current market growth rate with percentage
- Market trends and dynamics with specific examples

Competitive Landscape:
- List specific key competitors and their offerings
- Concrete competitive advantages and disadvantages
- Specific entry barriers with examples
- Market concentration analysis with evidence

Growth Potential:
- Specific key growth drivers with examples
- Concrete market expansion opportunities
- Potential risks and mitigation strategies
- Market timing considerations with rationale

2. Important:
- Use the perplexity tool when specific market data is needed
- Provide specific numbers and data points whenever possible
- If information is estimated, clearly state your assumptions
- Include sources or basis for your analysis

Format your response as JSON with the following structure:
{
  "analysis": "Detailed markdown analysis with sections and bullet points",
  "metrics": {
    "confidence_score": 0.7, // 0-1 scale
    "key_metrics": {
      "market_size": {
        "tam_usd": 5000000000, // in USD
        "sam_usd": 1000000000, // in USD
        "growth_rate_percent": 12.5
      },
      "competition_metrics": {
        "competitor_count": 5,
        "market_concentration": "medium", // high, medium, low
        "barrier_to_entry": "high" // high, medium, low
      },
      "market_dynamics": {
        "market_stage": "growth", // emerging, growth, mature, declining
        "risk_level": "medium" // high, medium, low
      }
    }
  }
}

Focus on providing actionable insights that would help the investor make an informed decision."#;

pub type MarketStep = PayloadStep<MarketMetrics>;

/// Market agent bound to the `perplexity` tool
pub fn market_step(perplexity: Arc<dyn Tool>) -> MarketStep {
    PayloadStep::new(
        StepName::Market,
        SYSTEM_PROMPT,
        PROMPT_TEMPLATE,
        vec![perplexity],
    )
}
