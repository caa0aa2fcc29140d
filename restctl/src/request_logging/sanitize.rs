//! Scrubbing of secrets from logged requests.

use axum::http::HeaderMap;
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Replacement for sensitive values.
pub const REPLACED: &str = "*** REPLACED ***";

/// Headers whose values are never stored (lowercase).
pub const SENSITIVE_HEADERS: [&str; 3] = ["authorization", "cookie", "x-api-key"];

/// Body fields whose values are never stored, matched case-insensitively at any depth.
pub const SENSITIVE_FIELDS: [&str; 3] = ["password", "plainpassword", "token"];

/// Headers as `{name: [values]}`, with sensitive values replaced.
pub fn sanitize_headers(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| {
                if SENSITIVE_HEADERS.contains(&name.as_str()) {
                    Value::String(REPLACED.to_string())
                } else {
                    Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned())
                }
            })
            .collect();
        map.insert(name.as_str().to_string(), Value::Array(values));
    }
    Value::Object(map)
}

/// `value` with every sensitive field replaced, recursively.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if SENSITIVE_FIELDS.contains(&key.to_lowercase().as_str()) {
                        (key, Value::String(REPLACED.to_string()))
                    } else {
                        (key, sanitize_value(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        other => other,
    }
}

/// Cut `content` to at most `max_chars` characters.
pub fn truncate(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => content[..end].to_string(),
        None => content.to_string(),
    }
}

/// Request body ready for storage: JSON bodies are sanitized, everything is truncated.
pub fn sanitize_content(body: &[u8], max_chars: usize) -> String {
    let content = match serde_json::from_slice::<Value>(body) {
        Ok(json) => sanitize_value(json).to_string(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    truncate(&content, max_chars)
}

/// Query and JSON body fields merged into one sanitized object. Body fields win.
pub fn parameters(query: Option<&str>, body: &[u8]) -> Value {
    let mut map = Map::new();

    if let Some(query) = query {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            map.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }

    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
        map.extend(fields);
    }

    sanitize_value(Value::Object(map))
}
