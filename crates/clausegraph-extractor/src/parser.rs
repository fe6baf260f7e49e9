//! Parse model output into clause candidates
//!
//! Accepted shapes, optionally wrapped in a markdown code block:
//!
//! ```text
//! [{"category": "...", "text": "...", "start": 0, "end": 12, "attributes": {...}}]
//! {"extractions": [ ...same items... ]}
//! {"extractions": [{"financial_term": "...", "financial_term_attributes": {...}}]}
//! ```
//!
//! Offsets are optional. When both are missing, the first exact occurrence
//! of the text in the chunk is used. Claimed offsets are kept as given, even
//! when they do not match, so grounding can reject them.

use clausegraph_domain::{Attributes, ClauseCandidate, DocumentTypeConfig, ExtractionError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse a model reply into candidates with chunk-local offsets
///
/// A reply that is not JSON of an accepted shape is a fatal error for the
/// pass. Individual malformed items are skipped.
pub fn parse_model_response(
    response: &str,
    chunk_text: &str,
    config: &DocumentTypeConfig,
) -> Result<Vec<ClauseCandidate>, ExtractionError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractionError::Fatal(format!("JSON parse error: {}", e)))?;

    let items = match &json {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("extractions")
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractionError::Fatal("Expected an \"extractions\" array".to_string()))?,
        _ => {
            return Err(ExtractionError::Fatal(
                "Expected a JSON array or object".to_string(),
            ))
        }
    };

    let mut candidates = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match parse_item(item, config) {
            Ok(raw) => {
                candidates.push(align(raw, chunk_text));
            }
            Err(e) => warn!(item = idx, "Skipping extraction: {}", e),
        }
    }

    Ok(candidates)
}

/// Locate the JSON payload, handling markdown code blocks and preambles
fn extract_json(response: &str) -> Result<&str, ExtractionError> {
    let trimmed = response.trim();

    let body = if trimmed.starts_with("```") {
        let after_fence = trimmed
            .find('\n')
            .map(|pos| &trimmed[pos + 1..])
            .ok_or_else(|| ExtractionError::Fatal("Empty code block".to_string()))?;
        after_fence
            .rfind("```")
            .map(|pos| &after_fence[..pos])
            .unwrap_or(after_fence)
            .trim()
    } else {
        trimmed
    };

    // Skip any prose before the payload
    match body.find(['[', '{']) {
        Some(pos) => Ok(&body[pos..]),
        None => Err(ExtractionError::Fatal("No JSON found in model reply".to_string())),
    }
}

/// An item as the model described it, before offset alignment
struct RawExtraction {
    category: String,
    text: String,
    start: Option<usize>,
    end: Option<usize>,
    attributes: Attributes,
}

fn parse_item(item: &Value, config: &DocumentTypeConfig) -> Result<RawExtraction, String> {
    let obj = item
        .as_object()
        .ok_or_else(|| "extraction is not a JSON object".to_string())?;

    let (category, text, attributes) = match obj.get("category").and_then(Value::as_str) {
        Some(category) => {
            let text = obj
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| "missing or invalid 'text'".to_string())?;
            (category.to_string(), text.to_string(), obj.get("attributes"))
        }
        None => keyed_by_category(obj, config)?,
    };

    if !config.has_category(&category) {
        return Err(format!("unknown category '{}'", category));
    }
    if text.is_empty() {
        return Err("empty 'text'".to_string());
    }

    Ok(RawExtraction {
        category,
        text,
        start: obj.get("start").and_then(Value::as_u64).map(|v| v as usize),
        end: obj.get("end").and_then(Value::as_u64).map(|v| v as usize),
        attributes: stringify_attributes(attributes),
    })
}

/// `{"<category>": "text", "<category>_attributes": {...}}`
fn keyed_by_category<'v>(
    obj: &'v Map<String, Value>,
    config: &DocumentTypeConfig,
) -> Result<(String, String, Option<&'v Value>), String> {
    let (category, text) = obj
        .iter()
        .find_map(|(key, value)| {
            if config.has_category(key) {
                value.as_str().map(|text| (key.clone(), text.to_string()))
            } else {
                None
            }
        })
        .ok_or_else(|| "missing 'category'".to_string())?;
    let attributes = obj.get(&format!("{}_attributes", category));
    Ok((category, text, attributes))
}

fn stringify_attributes(value: Option<&Value>) -> Attributes {
    let mut attributes = Attributes::new();
    if let Some(Value::Object(map)) = value {
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    attributes.insert(key.clone(), s.clone());
                }
                other => {
                    attributes.insert(key.clone(), other.to_string());
                }
            }
        }
    }
    attributes
}

/// Give the item chunk-local offsets
///
/// Only items without any offsets are anchored by searching the chunk. An
/// item whose text does not occur in the chunk gets `0..len` and fails
/// grounding like any other mismatch.
fn align(raw: RawExtraction, chunk_text: &str) -> ClauseCandidate {
    let len = raw.text.len();
    let (start, end) = match (raw.start, raw.end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, start + len),
        (None, Some(end)) => (end.saturating_sub(len), end),
        (None, None) => match chunk_text.find(&raw.text) {
            Some(pos) => (pos, pos + len),
            None => {
                debug!(category = %raw.category, "Extraction text not found in chunk");
                (0, len)
            }
        },
    };

    let mut candidate = ClauseCandidate::new(raw.category, raw.text, start, end);
    candidate.attributes = raw.attributes;
    candidate
}
