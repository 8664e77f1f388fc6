#![forbid(unsafe_code)]

use crate::server::{ApiResponse, bad_request};
use serde_json::{Map, Value};

pub(crate) fn parse_json_body(body: &[u8]) -> Result<Map<String, Value>, ApiResponse> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|_| bad_request("Corps JSON invalide"))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(bad_request("Corps JSON invalide")),
    }
}

/// Required string field with a minimum trimmed length. The error is a
/// ready-to-send 400 carrying the French validation message.
pub(crate) fn require_string(
    body: &Map<String, Value>,
    key: &str,
    min_chars: usize,
    error: &str,
) -> Result<String, ApiResponse> {
    match body.get(key) {
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            if trimmed.chars().count() < min_chars {
                return Err(bad_request(error));
            }
            Ok(trimmed.to_string())
        }
        _ => Err(bad_request(error)),
    }
}

pub(crate) fn optional_string(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key) {
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

pub(crate) fn require_f64(
    body: &Map<String, Value>,
    key: &str,
    error: &str,
) -> Result<f64, ApiResponse> {
    match body.get(key).and_then(Value::as_f64) {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(bad_request(error)),
    }
}

pub(crate) fn optional_f64(body: &Map<String, Value>, key: &str) -> Option<f64> {
    body.get(key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

pub(crate) fn optional_bool(body: &Map<String, Value>, key: &str) -> Option<bool> {
    body.get(key).and_then(Value::as_bool)
}

/// Non-empty array of non-empty strings.
pub(crate) fn require_string_array(
    body: &Map<String, Value>,
    key: &str,
    error: &str,
) -> Result<Vec<String>, ApiResponse> {
    let Some(Value::Array(items)) = body.get(key) else {
        return Err(bad_request(error));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(text) = item.as_str() else {
            return Err(bad_request(error));
        };
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    if out.is_empty() {
        return Err(bad_request(error));
    }
    Ok(out)
}

pub(crate) fn optional_string_array(body: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match body.get(key) {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Optional date field; absent or empty means `None`, a present but
/// unparseable value is a 400.
pub(crate) fn optional_date(
    body: &Map<String, Value>,
    key: &str,
    error: &str,
) -> Result<Option<i64>, ApiResponse> {
    match body.get(key) {
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match crate::parse_date_ms(trimmed) {
                Some(ms) => Ok(Some(ms)),
                None => Err(bad_request(error)),
            }
        }
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(bad_request(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn require_string_enforces_min_chars() {
        let map = body(json!({"title": "  ab  "}));
        assert!(require_string(&map, "title", 3, "too short").is_err());
        let map = body(json!({"title": "abc"}));
        assert_eq!(require_string(&map, "title", 3, "too short").ok(), Some("abc".to_string()));
    }

    #[test]
    fn optional_date_distinguishes_absent_from_bad() {
        let map = body(json!({}));
        assert_eq!(optional_date(&map, "deadline", "bad"), Ok(None));
        let map = body(json!({"deadline": ""}));
        assert_eq!(optional_date(&map, "deadline", "bad"), Ok(None));
        let map = body(json!({"deadline": "garbage"}));
        assert!(optional_date(&map, "deadline", "bad").is_err());
        let map = body(json!({"deadline": "2025-07-01"}));
        assert!(matches!(optional_date(&map, "deadline", "bad"), Ok(Some(_))));
    }

    #[test]
    fn string_arrays_drop_blank_entries() {
        let map = body(json!({"skills": ["Rust", "  ", "SQL"]}));
        let skills = require_string_array(&map, "skills", "missing").unwrap_or_default();
        assert_eq!(skills, vec!["Rust".to_string(), "SQL".to_string()]);
        let map = body(json!({"skills": []}));
        assert!(require_string_array(&map, "skills", "missing").is_err());
    }
}
