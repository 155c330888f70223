//! Data structures shared by the analysis agents and the orchestrator

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::lenient;

/// Identifies one of the four agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Investment,
    Founder,
    Market,
    Scoring,
}

impl StepName {
    /// Upstream agents in declared execution order
    pub const UPSTREAM: [StepName; 3] = [StepName::Investment, StepName::Founder, StepName::Market];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Investment => "investment",
            StepName::Founder => "founder",
            StepName::Market => "market",
            StepName::Scoring => "scoring",
        }
    }

    /// Capitalized name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            StepName::Investment => "Investment",
            StepName::Founder => "Founder",
            StepName::Market => "Market",
            StepName::Scoring => "Scoring",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input shared read-only by every agent of one orchestration call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub content: String,
    pub request_id: String,
}

impl AnalysisRequest {
    pub fn new(content: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            request_id: request_id.into(),
        }
    }
}

/// Result of one agent as recorded by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome<T> {
    Success { data: T },
    Failure { message: String },
}

impl<T> StepOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            StepOutcome::Success { data } => Some(data),
            StepOutcome::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            StepOutcome::Success { data } => Some(data),
            StepOutcome::Failure { .. } => None,
        }
    }
}

/// Saturate `value` into `[min, max]`; NaN maps to `min`
pub(crate) fn saturate(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Clamp a 0-100 score
pub fn clamp_score(value: f64) -> f64 {
    saturate(value, 0.0, 100.0)
}

/// Clamp a 0-1 confidence
pub fn clamp_confidence(value: f64) -> f64 {
    saturate(value, 0.0, 1.0)
}

fn in_score_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

fn in_confidence_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Tri-state rating used for risks and expertise levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Low", alias = "LOW")]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStage {
    #[default]
    #[serde(alias = "Emerging", alias = "EMERGING")]
    Emerging,
    #[serde(alias = "Growth", alias = "GROWTH")]
    Growth,
    #[serde(alias = "Mature", alias = "MATURE")]
    Mature,
    #[serde(alias = "Declining", alias = "DECLINING")]
    Declining,
}

/// Kind-specific metrics carried by an [`AnalysisPayload`]
///
/// `Default` is the documented fallback used when a response has no usable JSON.
pub trait StepMetrics:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
    fn confidence(&self) -> f64;

    /// Saturate every bounded field into its declared range
    fn clamp(&mut self);
}

/// Narrative plus structured metrics returned by the upstream agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload<M> {
    /// Markdown analysis
    #[serde(rename = "analysis")]
    pub narrative: String,
    pub metrics: M,
    /// Keys beyond the documented shape, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<M> AnalysisPayload<M> {
    pub fn new(narrative: impl Into<String>, metrics: M) -> Self {
        Self {
            narrative: narrative.into(),
            metrics,
            extra: Map::new(),
        }
    }
}

pub type InvestmentAnalysis = AnalysisPayload<InvestmentMetrics>;
pub type FounderAnalysis = AnalysisPayload<FounderMetrics>;
pub type MarketAnalysis = AnalysisPayload<MarketMetrics>;

// ----------------------------------------------------------------------------
// Investment metrics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentMetrics {
    #[serde(deserialize_with = "lenient::confidence")]
    pub confidence_score: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub key_metrics: InvestmentKeyMetrics,
    /// Keys beyond the documented shape, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for InvestmentMetrics {
    fn default() -> Self {
        Self {
            confidence_score: 0.5,
            key_metrics: InvestmentKeyMetrics::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentKeyMetrics {
    #[serde(deserialize_with = "lenient::or_default")]
    pub market_size: InvestmentMarketSize,
    #[serde(deserialize_with = "lenient::or_default")]
    pub risk_assessment: RiskAssessment,
    #[serde(deserialize_with = "lenient::or_default")]
    pub return_potential: ReturnPotential,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentMarketSize {
    /// Total addressable market in USD
    #[serde(deserialize_with = "lenient::number")]
    pub tam_usd: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub growth_rate_percent: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAssessment {
    #[serde(deserialize_with = "lenient::or_default")]
    pub overall_risk: Level,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_risks: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnPotential {
    #[serde(deserialize_with = "lenient::number")]
    pub estimated_roi_percent: f64,
    #[serde(deserialize_with = "lenient::horizon_years")]
    pub time_horizon_years: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ReturnPotential {
    fn default() -> Self {
        Self {
            estimated_roi_percent: 0.0,
            time_horizon_years: 5.0,
            extra: Map::new(),
        }
    }
}

impl StepMetrics for InvestmentMetrics {
    fn confidence(&self) -> f64 {
        self.confidence_score
    }

    fn clamp(&mut self) {
        self.confidence_score = clamp_confidence(self.confidence_score);
    }
}

// ----------------------------------------------------------------------------
// Founder metrics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FounderMetrics {
    #[serde(deserialize_with = "lenient::confidence")]
    pub confidence_score: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub key_metrics: FounderKeyMetrics,
    /// Keys beyond the documented shape, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FounderMetrics {
    fn default() -> Self {
        Self {
            confidence_score: 0.5,
            key_metrics: FounderKeyMetrics::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FounderKeyMetrics {
    /// Number of core team members
    #[serde(deserialize_with = "lenient::count")]
    pub team_size: u32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub technical_expertise_level: Level,
    #[serde(deserialize_with = "lenient::or_default")]
    pub business_expertise_level: Level,
    /// Average years in the industry
    #[serde(deserialize_with = "lenient::number")]
    pub industry_experience_years: f64,
    /// Number of previous startups
    #[serde(deserialize_with = "lenient::count")]
    pub previous_ventures: u32,
    /// 0-100
    #[serde(deserialize_with = "lenient::score")]
    pub team_completeness: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub risk_level: Level,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FounderKeyMetrics {
    fn default() -> Self {
        Self {
            team_size: 0,
            technical_expertise_level: Level::Medium,
            business_expertise_level: Level::Medium,
            industry_experience_years: 0.0,
            previous_ventures: 0,
            team_completeness: 50.0,
            risk_level: Level::Medium,
            extra: Map::new(),
        }
    }
}

impl StepMetrics for FounderMetrics {
    fn confidence(&self) -> f64 {
        self.confidence_score
    }

    fn clamp(&mut self) {
        self.confidence_score = clamp_confidence(self.confidence_score);
        self.key_metrics.team_completeness = clamp_score(self.key_metrics.team_completeness);
    }
}

// ----------------------------------------------------------------------------
// Market metrics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMetrics {
    #[serde(deserialize_with = "lenient::confidence")]
    pub confidence_score: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub key_metrics: MarketKeyMetrics,
    /// Keys beyond the documented shape, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MarketMetrics {
    fn default() -> Self {
        Self {
            confidence_score: 0.5,
            key_metrics: MarketKeyMetrics::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketKeyMetrics {
    #[serde(deserialize_with = "lenient::or_default")]
    pub market_size: MarketSize,
    #[serde(deserialize_with = "lenient::or_default")]
    pub competition_metrics: CompetitionMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub market_dynamics: MarketDynamics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSize {
    /// Total addressable market in USD
    #[serde(deserialize_with = "lenient::number")]
    pub tam_usd: f64,
    /// Serviceable addressable market in USD
    #[serde(deserialize_with = "lenient::number")]
    pub sam_usd: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub growth_rate_percent: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub competitor_count: u32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub market_concentration: Level,
    #[serde(deserialize_with = "lenient::or_default")]
    pub barrier_to_entry: Level,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDynamics {
    #[serde(deserialize_with = "lenient::or_default")]
    pub market_stage: MarketStage,
    #[serde(deserialize_with = "lenient::or_default")]
    pub risk_level: Level,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepMetrics for MarketMetrics {
    fn confidence(&self) -> f64 {
        self.confidence_score
    }

    fn clamp(&mut self) {
        self.confidence_score = clamp_confidence(self.confidence_score);
    }
}

// ----------------------------------------------------------------------------
// Scoring
// ----------------------------------------------------------------------------

/// Final investment recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongConsider,
    Consider,
    #[default]
    NeedsReview,
    Pass,
}

impl Recommendation {
    pub const ALL: [Recommendation; 4] = [
        Recommendation::StrongConsider,
        Recommendation::Consider,
        Recommendation::NeedsReview,
        Recommendation::Pass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongConsider => "strong_consider",
            Recommendation::Consider => "consider",
            Recommendation::NeedsReview => "needs_review",
            Recommendation::Pass => "pass",
        }
    }

    /// Exact wire token lookup (`"strong_consider"`, `"pass"`, ...)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == token)
    }
}

/// Assessment of one scoring category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryScore {
    /// 0-100
    #[serde(deserialize_with = "lenient::score")]
    pub score: f64,
    /// 0-1
    #[serde(deserialize_with = "lenient::confidence")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "lenient::assessment")]
    pub assessment: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategoryScore {
    pub const DEFAULT_SCORE: f64 = 50.0;
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;
    pub const DEFAULT_ASSESSMENT: &'static str = "Insufficient data for detailed assessment";

    fn clamp(&mut self) {
        self.score = clamp_score(self.score);
        self.confidence = clamp_confidence(self.confidence);
    }

    fn in_range(&self) -> bool {
        in_score_range(self.score) && in_confidence_range(self.confidence)
    }
}

impl Default for CategoryScore {
    fn default() -> Self {
        Self {
            score: Self::DEFAULT_SCORE,
            confidence: Self::DEFAULT_CONFIDENCE,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            assessment: Self::DEFAULT_ASSESSMENT.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// 0-100
    #[serde(deserialize_with = "lenient::score")]
    pub overall: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub team: CategoryScore,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub market: CategoryScore,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub technical: CategoryScore,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub innovation: CategoryScore,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scores {
    fn categories_mut(&mut self) -> [&mut CategoryScore; 4] {
        [
            &mut self.team,
            &mut self.market,
            &mut self.technical,
            &mut self.innovation,
        ]
    }

    pub fn categories(&self) -> [(&'static str, &CategoryScore); 4] {
        [
            ("team", &self.team),
            ("market", &self.market),
            ("technical", &self.technical),
            ("innovation", &self.innovation),
        ]
    }
}

/// Output of the scoring agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scores: Scores,
    pub recommendation: Recommendation,
    /// 0-1
    #[serde(deserialize_with = "lenient::confidence")]
    pub confidence_level: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_insights: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub risk_factors: Vec<String>,
    /// Keys beyond the documented shape, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScoringResult {
    pub const DEFAULT_OVERALL: f64 = 50.0;
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;
    pub const DEFAULT_INSIGHT: &'static str = "Investment requires further analysis";
    pub const DEFAULT_RISK: &'static str = "Insufficient data to fully assess risks";

    /// Saturate every score into [0,100] and every confidence into [0,1]
    pub fn clamp(&mut self) {
        self.scores.overall = clamp_score(self.scores.overall);
        for category in self.scores.categories_mut() {
            category.clamp();
        }
        self.confidence_level = clamp_confidence(self.confidence_level);
    }

    /// True when every bounded field lies in its declared range
    pub fn in_range(&self) -> bool {
        in_score_range(self.scores.overall)
            && in_confidence_range(self.confidence_level)
            && self.scores.categories().iter().all(|(_, c)| c.in_range())
    }
}

impl Default for ScoringResult {
    fn default() -> Self {
        Self {
            scores: Scores {
                overall: Self::DEFAULT_OVERALL,
                team: CategoryScore::default(),
                market: CategoryScore::default(),
                technical: CategoryScore::default(),
                innovation: CategoryScore::default(),
                extra: Map::new(),
            },
            recommendation: Recommendation::NeedsReview,
            confidence_level: Self::DEFAULT_CONFIDENCE,
            key_insights: vec![Self::DEFAULT_INSIGHT.to_string()],
            risk_factors: vec![Self::DEFAULT_RISK.to_string()],
            extra: Map::new(),
        }
    }
}

// ----------------------------------------------------------------------------
// Orchestration results
// ----------------------------------------------------------------------------

/// Outcomes of the upstream agents, as handed to the scoring agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResults {
    pub investment_analysis: Option<StepOutcome<InvestmentAnalysis>>,
    pub founder_analysis: Option<StepOutcome<FounderAnalysis>>,
    pub market_analysis: Option<StepOutcome<MarketAnalysis>>,
}

impl AgentResults {
    /// True when at least one upstream agent succeeded
    pub fn any_success(&self) -> bool {
        !self.successful_view().is_empty()
    }

    /// View holding only the data of agents that succeeded
    pub fn successful_view(&self) -> SuccessfulAnalyses<'_> {
        SuccessfulAnalyses {
            investment_analysis: self.investment_analysis.as_ref().and_then(StepOutcome::data),
            founder_analysis: self.founder_analysis.as_ref().and_then(StepOutcome::data),
            market_analysis: self.market_analysis.as_ref().and_then(StepOutcome::data),
        }
    }
}

/// Reduced view of [`AgentResults`]; failed or absent agents are omitted entirely
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuccessfulAnalyses<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_analysis: Option<&'a InvestmentAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founder_analysis: Option<&'a FounderAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<&'a MarketAnalysis>,
}

impl SuccessfulAnalyses<'_> {
    pub fn len(&self) -> usize {
        [
            self.investment_analysis.is_some(),
            self.founder_analysis.is_some(),
            self.market_analysis.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Metadata attached to every [`CombinedResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Agents that were attempted, in execution order
    pub agents_run: Vec<StepName>,
    pub execution_time_ms: u64,
}

/// Envelope returned by [`crate::Orchestrator::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub investment: Option<InvestmentAnalysis>,
    pub founder: Option<FounderAnalysis>,
    pub market: Option<MarketAnalysis>,
    pub scoring: Option<ScoringResult>,
    /// Error messages in the order they occurred
    pub errors: Vec<String>,
    pub meta: AnalysisMeta,
}
