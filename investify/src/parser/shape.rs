//! Structural validation of parsed JSON before any typed access

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Recommendation;

/// Why a JSON candidate does not have the expected shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeViolation {
    #[error("not valid JSON: {0}")]
    Syntax(String),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unrecognized recommendation `{0}`")]
    UnknownRecommendation(String),

    #[error("could not decode: {0}")]
    Decode(String),
}

type Object = Map<String, Value>;

fn as_object(value: &Value) -> Result<&Object, ShapeViolation> {
    value.as_object().ok_or(ShapeViolation::NotAnObject)
}

fn field<'a>(object: &'a Object, name: &'static str) -> Result<&'a Value, ShapeViolation> {
    object.get(name).ok_or(ShapeViolation::MissingField(name))
}

fn require_object<'a>(
    object: &'a Object,
    name: &'static str,
) -> Result<&'a Object, ShapeViolation> {
    field(object, name)?.as_object().ok_or(ShapeViolation::WrongType {
        field: name,
        expected: "an object",
    })
}

fn require_str<'a>(object: &'a Object, name: &'static str) -> Result<&'a str, ShapeViolation> {
    field(object, name)?.as_str().ok_or(ShapeViolation::WrongType {
        field: name,
        expected: "a string",
    })
}

fn require_number(object: &Object, name: &'static str) -> Result<f64, ShapeViolation> {
    field(object, name)?.as_f64().ok_or(ShapeViolation::WrongType {
        field: name,
        expected: "a number",
    })
}

fn require_array(object: &Object, name: &'static str) -> Result<(), ShapeViolation> {
    if field(object, name)?.is_array() {
        Ok(())
    } else {
        Err(ShapeViolation::WrongType {
            field: name,
            expected: "an array",
        })
    }
}

/// `{ "analysis": string, "metrics": object }`
pub fn check_payload_shape(value: &Value) -> Result<(), ShapeViolation> {
    let object = as_object(value)?;
    require_str(object, "analysis")?;
    require_object(object, "metrics")?;
    Ok(())
}

/// `scores.overall` number, `confidence_level` number, `key_insights` and
/// `risk_factors` arrays, and a known `recommendation`
pub fn check_scoring_shape(value: &Value) -> Result<(), ShapeViolation> {
    let object = as_object(value)?;
    let scores = require_object(object, "scores")?;
    require_number(scores, "overall")?;
    require_number(object, "confidence_level")?;
    require_array(object, "key_insights")?;
    require_array(object, "risk_factors")?;

    let recommendation = require_str(object, "recommendation")?;
    if Recommendation::from_token(recommendation).is_none() {
        return Err(ShapeViolation::UnknownRecommendation(
            recommendation.to_string(),
        ));
    }

    Ok(())
}
