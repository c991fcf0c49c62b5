//! Generic key/value parameter maps shared by the resolver, the engine and
//! the command bridge.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Generic parameter map a typed tool input is flattened into.
pub type ParamMap = serde_json::Map<String, Value>;

/// A value counts as empty when it is null or a blank/whitespace-only string.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Serialize a JSON value with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    fn normalize(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<&String, Value> =
                    map.iter().map(|(k, v)| (k, normalize(v))).collect();
                let mut out = serde_json::Map::new();
                for (k, v) in sorted {
                    out.insert(k.clone(), v);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
            other => other.clone(),
        }
    }
    normalize(value).to_string()
}

/// Render a parameter value as plain text (strings unquoted).
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Non-empty text value of `key`; numbers and booleans are rendered.
pub fn param_text(params: &ParamMap, key: &str) -> Option<String> {
    let value = params.get(key)?;
    if is_empty_value(Some(value)) {
        return None;
    }
    Some(value_as_text(value))
}

/// Integer value of `key`, also accepting numeric strings.
pub fn param_i64(params: &ParamMap, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn param_bool(params: &ParamMap, key: &str) -> Option<bool> {
    match params.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Serde helper for identifier fields: accepts a string or a scalar.
///
/// Text commands coerce `service_id=1` to an integer, so typed tool inputs
/// take ids through this.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Ok(v.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or scalar, got {}",
            other
        ))),
    }
}

/// Optional variant of [`deserialize_text`]; null and blank become `None`.
pub fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or scalar, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(is_empty_value(Some(&json!("   \t"))));
        assert!(!is_empty_value(Some(&json!("web-1"))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(false))));
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let a = json!({"b": 1, "a": {"z": true, "y": [ {"k2": 1, "k1": 2} ]}});
        assert_eq!(
            canonical_json(&a),
            r#"{"a":{"y":[{"k1":2,"k2":1}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(&json!("prod")), "prod");
        assert_eq!(value_as_text(&json!(42)), "42");
    }

    #[test]
    fn test_param_accessors() {
        let params = json!({"limit": "5", "max_parallel": 2, "firing": "true", "env": " "})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(param_i64(&params, "limit"), Some(5));
        assert_eq!(param_i64(&params, "max_parallel"), Some(2));
        assert_eq!(param_bool(&params, "firing"), Some(true));
        assert_eq!(param_text(&params, "env"), None);
        assert_eq!(param_text(&params, "max_parallel").as_deref(), Some("2"));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "deserialize_text")]
        service_id: String,
        #[serde(default, deserialize_with = "deserialize_opt_text")]
        env: Option<String>,
    }

    #[test]
    fn test_deserialize_text_accepts_numbers() {
        let ids: Ids = serde_json::from_value(json!({"service_id": 1})).unwrap();
        assert_eq!(ids.service_id, "1");
        assert!(ids.env.is_none());

        let ids: Ids = serde_json::from_value(json!({"service_id": "svc", "env": ""})).unwrap();
        assert!(ids.env.is_none());

        assert!(serde_json::from_value::<Ids>(json!({"service_id": [1]})).is_err());
    }
}
