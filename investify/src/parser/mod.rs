//! Turning raw model replies into typed analysis values
//!
//! Parsing never fails. Candidates are tried in order:
//! 1. Each fenced ```json block
//! 2. Each brace-balanced object that mentions the expected top-level keys
//! 3. A best-effort value built from the text itself
//!
//! A candidate is accepted only if it decodes as JSON and passes the shape check
//! for the target type. Once accepted, typed decoding does not reject it: fields
//! that do not fit take their defaults and unknown keys are kept in `extra`.

pub mod json;
pub mod sections;
pub mod shape;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{AnalysisPayload, ScoringResult, StepMetrics};
use json::{balanced_objects, fenced_json_blocks, strip_line_comments};
pub use shape::ShapeViolation;

/// A type that can be recovered from a model reply
pub trait ExpectedShape: DeserializeOwned {
    /// Keys an embedded object must mention to be considered at all
    const REQUIRED_KEYS: [&'static str; 2];

    fn check_shape(value: &Value) -> Result<(), ShapeViolation>;

    /// Value to use when no JSON candidate is acceptable
    fn from_text(raw: &str) -> Self;
}

impl<M: StepMetrics> ExpectedShape for AnalysisPayload<M> {
    const REQUIRED_KEYS: [&'static str; 2] = ["analysis", "metrics"];

    fn check_shape(value: &Value) -> Result<(), ShapeViolation> {
        shape::check_payload_shape(value)
    }

    fn from_text(raw: &str) -> Self {
        AnalysisPayload::new(raw, M::default())
    }
}

impl ExpectedShape for ScoringResult {
    const REQUIRED_KEYS: [&'static str; 2] = ["scores", "recommendation"];

    fn check_shape(value: &Value) -> Result<(), ShapeViolation> {
        shape::check_scoring_shape(value)
    }

    fn from_text(raw: &str) -> Self {
        sections::extract_scoring(raw)
    }
}

/// Where a parsed value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    FencedJson,
    EmbeddedJson,
    Text,
}

/// Parse a model reply into `T`
pub fn parse_response<T: ExpectedShape>(raw: &str) -> T {
    parse_with_source(raw).0
}

/// Like [`parse_response`], also reporting which strategy produced the value
pub fn parse_with_source<T: ExpectedShape>(raw: &str) -> (T, ParseSource) {
    if let Some(value) = fenced_json_blocks(raw).find_map(|block| decode::<T>(block).ok()) {
        return (value, ParseSource::FencedJson);
    }

    if let Some(value) = balanced_objects(raw)
        .filter(|candidate| mentions_required_keys::<T>(candidate))
        .find_map(|candidate| decode::<T>(candidate).ok())
    {
        return (value, ParseSource::EmbeddedJson);
    }

    (T::from_text(raw), ParseSource::Text)
}

/// Decode one JSON candidate, checking its shape before typed access
pub fn decode<T: ExpectedShape>(candidate: &str) -> Result<T, ShapeViolation> {
    let value: Value = serde_json::from_str(&strip_line_comments(candidate))
        .map_err(|e| ShapeViolation::Syntax(e.to_string()))?;
    T::check_shape(&value)?;
    serde_json::from_value(value).map_err(|e| ShapeViolation::Decode(e.to_string()))
}

fn mentions_required_keys<T: ExpectedShape>(candidate: &str) -> bool {
    T::REQUIRED_KEYS
        .iter()
        .all(|key| candidate.contains(&format!("\"{key}\"")))
}
