//! Defensive parsing of the model's answer

use crate::domain::{ExternalDetection, ExternalDetectionError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const STANDARD_KEYS: [&str; 2] = ["standard_personal_info", "개인정보"];
const ADDITIONAL_KEYS: [&str; 2] = ["additional_requested_info", "추가 탐지 정보"];
/// Top-level arrays some answers put next to (or instead of) the maps
const TOP_LEVEL_LISTS: [&str; 4] = ["names", "addresses", "이름", "주소"];

/// Parse the text content of a model answer
///
/// Accepts the JSON wrapped in a markdown code fence, the Korean key
/// variants and top-level `names`/`addresses` lists. Non-string values are
/// ignored and missing keys default to empty.
///
/// # Errors
///
/// [`ExternalDetectionError::InvalidResponse`] when the content is not a
/// JSON object.
pub fn parse_detection_response(content: &str) -> Result<ExternalDetection, ExternalDetectionError> {
    let body = strip_code_fence(content);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExternalDetectionError::InvalidResponse(e.to_string()))?;

    let Value::Object(root) = value else {
        return Err(ExternalDetectionError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let mut detection = ExternalDetection::default();

    for key in STANDARD_KEYS {
        if let Some(Value::Object(map)) = root.get(key) {
            collect_map(map, &mut detection.standard_personal_info);
        }
    }

    for key in ADDITIONAL_KEYS {
        if let Some(Value::Object(map)) = root.get(key) {
            collect_map(map, &mut detection.additional_requested_info);
        }
    }

    for key in TOP_LEVEL_LISTS {
        if let Some(value) = root.get(key) {
            let literals = string_values(value);
            if !literals.is_empty() {
                detection
                    .standard_personal_info
                    .entry(key.to_string())
                    .or_default()
                    .extend(literals);
            }
        }
    }

    Ok(detection)
}

fn collect_map(map: &Map<String, Value>, into: &mut BTreeMap<String, Vec<String>>) {
    for (key, value) in map {
        let literals = string_values(value);
        if !literals.is_empty() {
            into.entry(key.clone()).or_default().extend(literals);
        }
    }
}

fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Remove a surrounding ```json ... ``` fence, if any
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
