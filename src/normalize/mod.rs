//! Result normalizers
//!
//! Each normalizer takes a [`RawProviderResponse`] and produces the fixed
//! result shape of one capability, or [`ServiceError::MalformedResponse`].
//! Required fields are never defaulted and scores are range-checked.

mod media;
mod structured;

pub use media::{image_generation, speech, speech_output_url, transcription};
pub use structured::{
    api_docs, code_generation, code_review, entities, moderation, ocr, quiz, regex, seo,
    sentiment, sql, translation,
};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::providers::RawProviderResponse;

/// Scores this far outside [0, 1] are clamped rather than rejected.
const SCORE_TOLERANCE: f64 = 1e-6;

/// Chat text, trimmed. Empty text is malformed.
pub fn free_text(raw: RawProviderResponse, capability: Capability) -> Result<String> {
    match raw {
        RawProviderResponse::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(ServiceError::malformed(capability, "empty response text"))
            } else {
                Ok(trimmed.to_string())
            }
        }
        other => Err(unexpected(capability, &other)),
    }
}

fn unexpected(capability: Capability, raw: &RawProviderResponse) -> ServiceError {
    let kind = match raw {
        RawProviderResponse::Text(_) => "text",
        RawProviderResponse::Structured(_) => "structured",
        RawProviderResponse::JobHandle(_) => "unfinished job",
        RawProviderResponse::Binary(_) => "binary",
    };
    ServiceError::malformed(capability, format!("unexpected {kind} response"))
}

/// Pull one JSON value out of model text.
///
/// Tries the whole text, then a fenced code block, then the outermost
/// `{ ... }` span.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fenced)
    {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip an optional language tag on the opening fence line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// The JSON object carried by a response: parsed from text or taken as-is.
fn structured_object(raw: RawProviderResponse, capability: Capability) -> Result<Map<String, Value>> {
    match raw {
        RawProviderResponse::Structured(map) => Ok(map),
        RawProviderResponse::Text(text) => match extract_json(&text) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(ServiceError::malformed(capability, "expected a JSON object")),
            None => Err(ServiceError::malformed(capability, "no JSON object in response")),
        },
        other => Err(unexpected(capability, &other)),
    }
}

fn decode<T: DeserializeOwned>(map: Map<String, Value>, capability: Capability) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(|e| ServiceError::malformed(capability, e.to_string()))
}

/// Parse a structured response straight into `T`.
fn parse<T: DeserializeOwned>(raw: RawProviderResponse, capability: Capability) -> Result<T> {
    decode(structured_object(raw, capability)?, capability)
}

/// Check that `value` is a finite score in [0, 1], clamping float noise.
fn unit_interval(value: f64, field: &str, capability: Capability) -> Result<f64> {
    if !value.is_finite() {
        return Err(ServiceError::malformed(
            capability,
            format!("{field} is not a finite number"),
        ));
    }
    if (-SCORE_TOLERANCE..=1.0 + SCORE_TOLERANCE).contains(&value) {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Err(ServiceError::malformed(
            capability,
            format!("{field} {value} is outside [0, 1]"),
        ))
    }
}

fn non_empty(value: &str, field: &str, capability: Capability) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::malformed(capability, format!("{field} is empty")));
    }
    Ok(())
}
