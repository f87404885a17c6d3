//! Response normalizer. Tolerant parsing of the model's free-form reply.
//!
//! Order of attempts (first success wins):
//! 1. Greedy span from the first `{` to the last `}`
//! 2. First balanced `{...}` object found by a string-aware brace scan
//! 3. The whole raw text
//! 4. Fallback: `score = null`, `recommendation = raw text`. A non-conforming reply
//!    is never discarded, only denied a numeric score.
//!
//! Validation happens at the call site via `ScoringResult::into_evaluation`.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::errors::AppError;

/// The normalized model reply. Serialized as-is by `POST /api/scoreCandidate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub score: Option<Number>,
    pub recommendation: String,
}

/// A validated evaluation: integer score in 1..=100 and a non-empty recommendation.
///
/// Only obtainable through `ScoringResult::into_evaluation`, so the persister
/// cannot be handed a half-formed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    score: u8,
    recommendation: String,
}

impl Evaluation {
    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 100;

impl ScoringResult {
    /// Checks the result before it may be persisted as a final score.
    pub fn into_evaluation(self) -> Result<Evaluation, AppError> {
        let number = self.score.ok_or_else(|| {
            AppError::MalformedScoringResponse("score is missing or not a number".to_string())
        })?;

        let value = number
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                AppError::MalformedScoringResponse(format!("score {number} is not a finite number"))
            })?;

        if value.fract() != 0.0 {
            return Err(AppError::MalformedScoringResponse(format!(
                "score {number} is not an integer"
            )));
        }

        if value < f64::from(MIN_SCORE) || value > f64::from(MAX_SCORE) {
            return Err(AppError::MalformedScoringResponse(format!(
                "score {number} is outside {MIN_SCORE}-{MAX_SCORE}"
            )));
        }

        if self.recommendation.trim().is_empty() {
            return Err(AppError::MalformedScoringResponse(
                "recommendation is empty".to_string(),
            ));
        }

        Ok(Evaluation {
            score: value as u8,
            recommendation: self.recommendation,
        })
    }
}

/// Parses the raw model reply into a `ScoringResult`. Never fails.
pub fn normalize_response(raw: &str) -> ScoringResult {
    if let Some(result) = greedy_object_span(raw).and_then(|span| decode_object(span, raw)) {
        return result;
    }

    if let Some(result) = balanced_object_spans(raw)
        .into_iter()
        .find_map(|span| decode_object(span, raw))
    {
        return result;
    }

    if let Some(result) = decode_object(raw, raw) {
        return result;
    }

    ScoringResult {
        score: None,
        recommendation: raw.to_string(),
    }
}

/// First `{` through last `}`, inclusive.
fn greedy_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Every balanced `{...}` span, in order of its opening brace.
/// Braces inside JSON string literals do not count.
fn balanced_object_spans(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut spans = Vec::new();

    for (start, _) in raw.match_indices('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        spans.push(&raw[start..=start + offset]);
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    spans
}

/// Decodes `text` as a JSON object and lifts out `score` and `recommendation`.
///
/// Only objects carrying a numeric `score` or a non-blank string `recommendation`
/// count as scoring replies. A missing or blank recommendation is replaced by the
/// raw reply so the model's text is never lost.
fn decode_object(text: &str, raw: &str) -> Option<ScoringResult> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) else {
        return None;
    };

    let score = match map.get("score") {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };

    let has_text =
        matches!(map.get("recommendation"), Some(Value::String(s)) if !s.trim().is_empty());
    if score.is_none() && !has_text {
        return None;
    }

    let recommendation = match map.get("recommendation") {
        Some(Value::String(s)) if has_text => s.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => raw.to_string(),
        Some(other) => other.to_string(),
    };

    Some(ScoringResult {
        score,
        recommendation,
    })
}
