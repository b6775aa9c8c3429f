//! Reading JSON payloads out of model responses.
//!
//! Models often wrap JSON in a markdown code fence even when asked for raw
//! JSON. [`extract_payload`] strips the fence if there is one, and the
//! coalescing helpers pull individual fields out of whatever shape came back
//! without trusting it.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::PayloadError;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?i:json)?(.*?)```").expect("Invalid regex")
});

/// Parse the JSON payload in `raw`.
///
/// If `raw` contains a fenced code block (optionally tagged `json`) the first
/// block's interior is parsed, otherwise the whole text is. Blank input gives
/// an empty object.
pub fn extract_payload(raw: &str) -> Result<Value, PayloadError> {
    let body = match FENCED_BLOCK.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw,
    };

    let body = body.trim();
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    Ok(serde_json::from_str(body)?)
}

/// A non-blank string field, or `None` when absent, blank, or not a string.
pub fn text_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A field rendered as text whatever scalar type the model used.
/// Used for pass-through fields where the shape is not validated.
pub fn scalar_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(scalar_text)
}

/// A list of strings. Scalars inside the array are stringified, nested
/// objects, arrays and nulls are dropped, and a non-array gives `[]`.
pub fn string_list(payload: &Value, key: &str) -> Vec<String> {
    match payload.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    }
}

/// The objects of an array field, skipping anything that is not an object.
pub fn object_list<'a>(payload: &'a Value, key: &str) -> Vec<&'a Map<String, Value>> {
    match payload.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Text of a string, number or boolean value.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        let value = extract_payload(r#"{"summary": "hi"}"#).unwrap();
        assert_eq!(value, json!({"summary": "hi"}));
    }

    #[test]
    fn test_fenced_json() {
        let raw = "Here you go:\n```json\n{\"summary\": \"hi\"}\n```\nThanks";
        assert_eq!(extract_payload(raw).unwrap(), json!({"summary": "hi"}));
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        let raw = "```JSON\n[1, 2]\n```";
        assert_eq!(extract_payload(raw).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_payload(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_first_fence_wins() {
        let raw = "```json\n{\"a\": 1}\n```\n```json\n{\"a\": 2}\n```";
        assert_eq!(extract_payload(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_empty_input_is_empty_object() {
        assert_eq!(extract_payload("").unwrap(), json!({}));
        assert_eq!(extract_payload("   \n").unwrap(), json!({}));
        assert_eq!(extract_payload("```json\n```").unwrap(), json!({}));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(extract_payload("not json at all").is_err());
        assert!(extract_payload("```json\n{broken\n```").is_err());
    }

    #[test]
    fn test_text_field() {
        let payload = json!({"a": "  value ", "b": "   ", "c": 3});
        assert_eq!(text_field(&payload, "a"), Some("value".to_string()));
        assert_eq!(text_field(&payload, "b"), None);
        assert_eq!(text_field(&payload, "c"), None);
        assert_eq!(text_field(&payload, "missing"), None);
    }

    #[test]
    fn test_scalar_field() {
        let payload = json!({"n": 4, "s": "High", "o": {}});
        assert_eq!(scalar_field(&payload, "n"), Some("4".to_string()));
        assert_eq!(scalar_field(&payload, "s"), Some("High".to_string()));
        assert_eq!(scalar_field(&payload, "o"), None);
    }

    #[test]
    fn test_string_list() {
        let payload = json!({
            "list": ["a", 2, true, null, {"x": 1}, ["y"]],
            "not_list": "a"
        });
        assert_eq!(string_list(&payload, "list"), vec!["a", "2", "true"]);
        assert!(string_list(&payload, "not_list").is_empty());
        assert!(string_list(&payload, "missing").is_empty());
        assert!(string_list(&json!([1, 2]), "list").is_empty());
    }

    #[test]
    fn test_object_list() {
        let payload = json!({"refs": [{"title": "A"}, "junk", {"title": "B"}]});
        let objects = object_list(&payload, "refs");
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["title"], "B");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn json_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| json!(n)),
                "[a-zA-Z0-9 .,'!?-]{0,20}".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::btree_map("[a-zA-Z]{1,8}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn fenced_payload_parses_like_bare_payload(value in json_value(), pretty in any::<bool>()) {
                let text = if pretty {
                    serde_json::to_string_pretty(&value).unwrap()
                } else {
                    serde_json::to_string(&value).unwrap()
                };
                let fenced = format!("```json{}```", text);

                let bare = extract_payload(&text).unwrap();
                let unwrapped = extract_payload(&fenced).unwrap();
                prop_assert_eq!(bare, unwrapped);
            }
        }
    }
}
