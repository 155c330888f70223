//! Heuristic extraction of a scoring result from prose
//!
//! Used when the scoring agent's reply carries no JSON of the expected shape.
//! Labels are case-insensitive regex fragments matched before a `:`.

use regex::Regex;
use serde_json::Map;
use std::sync::OnceLock;

use crate::types::{
    clamp_confidence, clamp_score, CategoryScore, Recommendation, ScoringResult, Scores,
};

/// Top-level headers of a scoring report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ExecutiveSummary,
    TeamAnalysis,
    MarketAnalysis,
    TechnicalAnalysis,
    InnovationAssessment,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::ExecutiveSummary,
        Section::TeamAnalysis,
        Section::MarketAnalysis,
        Section::TechnicalAnalysis,
        Section::InnovationAssessment,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "Executive Summary",
            Section::TeamAnalysis => "Team Analysis",
            Section::MarketAnalysis => "Market Analysis",
            Section::TechnicalAnalysis => "Technical Analysis",
            Section::InnovationAssessment => "Innovation Assessment",
        }
    }

    fn from_header(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.header().eq_ignore_ascii_case(text.trim()))
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)^[ \t#>*_-]*(executive summary|team analysis|market analysis|technical analysis|innovation assessment)[ \t*_]*:",
        )
        .expect("section header pattern is valid")
    })
}

fn bullet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[-*•+]|\d+[.)])\s+(.+)$").expect("bullet pattern is valid")
    })
}

fn recommendation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\brecommendation[^:\n]*:[\s*_"'`]*([a-z][a-z _-]*)"#)
            .expect("recommendation pattern is valid")
    })
}

/// Report split into its header sections
///
/// A body runs from its header to the next recognized header. When a header
/// repeats, the first occurrence wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sections<'a> {
    bodies: [Option<&'a str>; 5],
}

impl<'a> Sections<'a> {
    pub fn split(text: &'a str) -> Self {
        let headers: Vec<(Section, usize, usize)> = header_regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let section = Section::from_header(caps.get(1)?.as_str())?;
                Some((section, whole.start(), whole.end()))
            })
            .collect();

        let mut sections = Sections::default();
        for (idx, (section, _, body_start)) in headers.iter().enumerate() {
            let body_end = headers
                .get(idx + 1)
                .map(|(_, next_start, _)| *next_start)
                .unwrap_or(text.len());
            let slot = &mut sections.bodies[*section as usize];
            if slot.is_none() {
                *slot = Some(&text[*body_start..body_end]);
            }
        }
        sections
    }

    pub fn get(&self, section: Section) -> Option<&'a str> {
        self.bodies[section as usize]
    }
}

fn label_regex(label: &str, tail: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{label}{tail}")).ok()
}

/// First number after `label ...:`, with whether it carried a `%`
fn number_after(text: &str, label: &str) -> Option<(f64, bool)> {
    let re = label_regex(label, r"[^:\n]*:[\s*_]*(-?\d+(?:\.\d+)?)(\s*%)?")?;
    let caps = re.captures(text)?;
    let value = caps.get(1)?.as_str().parse().ok()?;
    Some((value, caps.get(2).is_some()))
}

/// Score-like number after a label, e.g. `Overall score (0-100): 72`
pub fn extract_score(text: &str, label: &str) -> Option<f64> {
    number_after(text, label).map(|(value, _)| value)
}

/// Confidence after `Confidence` or `Confidence level`; `80%` reads as 0.8
pub fn extract_confidence(text: &str) -> Option<f64> {
    number_after(text, r"confidence(?:\s+level)?").map(|(value, percent)| {
        if percent {
            value / 100.0
        } else {
            value
        }
    })
}

/// Bulleted list following the first label that yields items
///
/// Blank lines between the label and the first bullet are skipped. The list
/// ends at the first blank or non-bullet line after it.
pub fn extract_list(text: &str, labels: &[&str]) -> Option<Vec<String>> {
    labels
        .iter()
        .filter_map(|label| list_after(text, label))
        .find(|items| !items.is_empty())
}

fn list_after(text: &str, label: &str) -> Option<Vec<String>> {
    let re = label_regex(label, r"[ \t*_]*:")?;
    let found = re.find(text)?;
    let mut lines = text[found.end()..].lines();
    lines.next();

    let mut items = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if items.is_empty() {
                continue;
            }
            break;
        }
        match bullet_regex().captures(trimmed).and_then(|caps| caps.get(1)) {
            Some(item) => items.push(item.as_str().trim().to_string()),
            None => break,
        }
    }
    Some(items)
}

/// Free text after `label:` up to a blank line or a new capitalized line
pub fn extract_text(text: &str, label: &str) -> Option<String> {
    let re = label_regex(label, r"[ \t*_]*:")?;
    let found = re.find(text)?;
    let mut lines = text[found.end()..].lines();

    let first = lines
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches(&['*', '_'][..])
        .trim();
    let mut parts: Vec<&str> = Vec::new();
    if !first.is_empty() {
        parts.push(first);
    }

    for line in lines {
        let trimmed = line.trim();
        let starts_new_line = trimmed.starts_with(|c: char| c.is_ascii_uppercase());
        if trimmed.is_empty() || (starts_new_line && !parts.is_empty()) {
            break;
        }
        parts.push(trimmed);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Recommendation token after `Recommendation:`, matched loosely
///
/// `Strong Consider`, `strong-consider` and `needs review` all normalize to the
/// wire tokens. Unrecognized words yield `None`.
pub fn extract_recommendation(text: &str) -> Option<Recommendation> {
    let caps = recommendation_regex().captures(text)?;
    let token = caps
        .get(1)?
        .as_str()
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_");

    [
        Recommendation::StrongConsider,
        Recommendation::NeedsReview,
        Recommendation::Consider,
        Recommendation::Pass,
    ]
    .into_iter()
    .find(|candidate| {
        let wire = candidate.as_str();
        token == wire || token.starts_with(&format!("{wire}_"))
    })
}

/// Category score from one section body; absent sections get the defaults
pub fn extract_category(body: Option<&str>) -> CategoryScore {
    let Some(body) = body else {
        return CategoryScore::default();
    };

    CategoryScore {
        score: extract_score(body, "score")
            .map(clamp_score)
            .unwrap_or(CategoryScore::DEFAULT_SCORE),
        confidence: extract_confidence(body)
            .map(clamp_confidence)
            .unwrap_or(CategoryScore::DEFAULT_CONFIDENCE),
        strengths: extract_list(body, &["strengths"]).unwrap_or_default(),
        weaknesses: extract_list(body, &["weaknesses"]).unwrap_or_default(),
        assessment: extract_text(body, "assessment")
            .unwrap_or_else(|| CategoryScore::DEFAULT_ASSESSMENT.to_string()),
        extra: Map::new(),
    }
}

const OVERALL_LABEL: &str = r"overall(?:\s+score)?";
const INSIGHT_LABELS: &[&str] = &["key highlights", "key insights"];
const RISK_LABELS: &[&str] = &["key concerns", "risk factors"];

/// Build a complete, clamped [`ScoringResult`] from free text
///
/// Top-level values are looked up in the executive summary first and then in
/// the whole text. Missing pieces take the documented defaults.
pub fn extract_scoring(text: &str) -> ScoringResult {
    let sections = Sections::split(text);
    let executive = sections.get(Section::ExecutiveSummary);

    let overall = executive
        .and_then(|body| extract_score(body, OVERALL_LABEL))
        .or_else(|| extract_score(text, OVERALL_LABEL))
        .map(clamp_score)
        .unwrap_or(ScoringResult::DEFAULT_OVERALL);

    let recommendation = executive
        .and_then(extract_recommendation)
        .or_else(|| extract_recommendation(text))
        .unwrap_or_default();

    let confidence_level = executive
        .and_then(extract_confidence)
        .or_else(|| extract_confidence(text))
        .map(clamp_confidence)
        .unwrap_or(ScoringResult::DEFAULT_CONFIDENCE);

    let key_insights = executive
        .and_then(|body| extract_list(body, INSIGHT_LABELS))
        .or_else(|| extract_list(text, INSIGHT_LABELS))
        .unwrap_or_else(|| vec![ScoringResult::DEFAULT_INSIGHT.to_string()]);

    let risk_factors = executive
        .and_then(|body| extract_list(body, RISK_LABELS))
        .or_else(|| extract_list(text, RISK_LABELS))
        .unwrap_or_else(|| vec![ScoringResult::DEFAULT_RISK.to_string()]);

    ScoringResult {
        scores: Scores {
            overall,
            team: extract_category(sections.get(Section::TeamAnalysis)),
            market: extract_category(sections.get(Section::MarketAnalysis)),
            technical: extract_category(sections.get(Section::TechnicalAnalysis)),
            innovation: extract_category(sections.get(Section::InnovationAssessment)),
            extra: Map::new(),
        },
        recommendation,
        confidence_level,
        key_insights,
        risk_factors,
        extra: Map::new(),
    }
}
