use serde_json::Value;

use crate::error::RadError;

/// Literal replacements undoing the server's extra quoting layer, applied in order.
const REPAIR_PASSES: [(&str, &str); 7] = [
    (r#"["{"#, "[{"),
    (r#"}"]"#, "}]"),
    (r#"["["#, "[["),
    (r#"]"]"#, "]]"),
    (r#"["\""#, r#"[""#),
    (r#"\""]"#, r#""]"#),
    (r#"\""#, r#"""#),
];

pub fn normalize_response_text(raw: &str) -> String {
    REPAIR_PASSES
        .iter()
        .fold(raw.to_string(), |text, (from, to)| text.replace(from, to))
}

pub(crate) fn looks_like_object(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.contains(':')
}

/// Normalize a response body and unwrap its payload.
///
/// Text that does not look like a JSON object comes back as a string value.
pub fn decode_response(raw: &str) -> Result<Value, RadError> {
    let normalized = normalize_response_text(raw);
    if !looks_like_object(&normalized) {
        return Ok(Value::String(normalized));
    }

    let parsed: Value =
        serde_json::from_str(normalized.trim()).map_err(|err| RadError::Protocol {
            reason: err.to_string(),
            raw: normalized.clone(),
        })?;

    Ok(extract_result(parsed))
}

/// Pick the payload out of a parsed reply.
///
/// A mapping without `result`, `error` or `SessionExpired` yields the value
/// of its last key in server order. That branch depends on key order and is
/// not a stable contract.
pub fn extract_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(result) = map.remove("result") {
                return match result {
                    Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                    other => other,
                };
            }
            if let Some(error) = map.get("error") {
                return Value::String(format!("ERROR: {}", value_text(error)));
            }
            if let Some(expired) = map.get("SessionExpired") {
                return Value::String(format!("ERROR: {}", value_text(expired)));
            }
            map.into_iter().last().map_or(Value::Null, |(_, last)| last)
        }
        other if is_truthy(&other) => other,
        _ => Value::Null,
    }
}

/// Truthiness as the server's original clients saw it: null, false, zero and
/// empty containers are all false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Plain text for strings, JSON text for everything else.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn render_result(value: &Value) -> String {
    match value {
        Value::Null => "<NO RESULT>".to_string(),
        Value::Object(_) => pretty_json(value),
        other => value_text(other),
    }
}

fn pretty_json(value: &Value) -> String {
    use serde::Serialize;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| value.to_string())
}
