//! Keyword intent detection and `key=value` parameter extraction.

use super::action::{
    INTENT_AGGREGATE, INTENT_ALERTS, INTENT_APPROVE, INTENT_INVENTORY, INTENT_RELEASE,
    INTENT_ROLLBACK, INTENT_STATUS,
};
use crate::tool::ParamMap;
use serde_json::Value;

/// Keyword sets in priority order; the first set with a hit wins.
const INTENT_KEYWORDS: [(&str, &[&str]); 7] = [
    (
        INTENT_AGGREGATE,
        &["aggregate", "summary", "summarize", "overview", "dashboard"],
    ),
    (INTENT_ROLLBACK, &["rollback", "roll back", "revert"]),
    (INTENT_APPROVE, &["approve", "approval"]),
    (INTENT_RELEASE, &["release", "deploy"]),
    (INTENT_ALERTS, &["alert", "alarm", "firing"]),
    (INTENT_INVENTORY, &["inventory", "cmdb", "asset", "host"]),
    (INTENT_STATUS, &["status", "health"]),
];

/// Resolve the intent for free text; unmatched text falls back to the
/// aggregate status view.
pub fn detect_intent(text: &str) -> &'static str {
    matching_intents(text)
        .first()
        .copied()
        .unwrap_or(INTENT_AGGREGATE)
}

/// Every intent whose keywords appear in `text`, in priority order.
///
/// Matching is a substring test over the whole lower-cased text, so
/// `key=value` tokens take part too.
pub fn matching_intents(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    INTENT_KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(intent, _)| *intent)
        .collect()
}

/// Parse a single value: integer, then boolean, then string.
pub fn coerce_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Value::from(b);
    }
    Value::from(raw)
}

/// Extract `key=value` tokens from whitespace-separated text.
///
/// Each token is split on its first `=`; later tokens win on duplicate keys.
pub fn extract_params(text: &str) -> ParamMap {
    let mut params = ParamMap::new();
    for token in text.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        params.insert(key.to_string(), coerce_value(value));
    }
    params
}

/// Merge text-extracted parameters with structured ones; structured win.
pub fn merge_params(from_text: ParamMap, structured: &ParamMap) -> ParamMap {
    let mut merged = from_text;
    for (key, value) in structured {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_order() {
        assert_eq!(detect_intent("summary of rollback activity"), INTENT_AGGREGATE);
        assert_eq!(detect_intent("rollback the release"), INTENT_ROLLBACK);
        assert_eq!(detect_intent("approve release 42"), INTENT_APPROVE);
        assert_eq!(detect_intent("deployment.release service_id=1"), INTENT_RELEASE);
        assert_eq!(detect_intent("show firing alerts"), INTENT_ALERTS);
        assert_eq!(detect_intent("find host in cmdb"), INTENT_INVENTORY);
        assert_eq!(detect_intent("Status of checkout"), INTENT_STATUS);
    }

    #[test]
    fn test_unmatched_defaults_to_aggregate() {
        assert_eq!(detect_intent("what is going on"), INTENT_AGGREGATE);
        assert_eq!(detect_intent(""), INTENT_AGGREGATE);
    }

    #[test]
    fn test_assignments_take_part_in_detection() {
        assert_eq!(detect_intent("status host_id=3"), INTENT_INVENTORY);
        assert_eq!(
            matching_intents("status deployment_id=dep-1"),
            vec![INTENT_RELEASE, INTENT_STATUS]
        );
        assert_eq!(detect_intent("status service_id=svc-1"), INTENT_STATUS);
    }

    #[test]
    fn test_matching_intents_lists_all_hits() {
        assert_eq!(
            matching_intents("release status"),
            vec![INTENT_RELEASE, INTENT_STATUS]
        );
    }

    #[test]
    fn test_extract_and_coerce() {
        let params = extract_params("release service_id=12 dry_run=true version=v1.2 note=a=b");
        assert_eq!(params["service_id"], json!(12));
        assert_eq!(params["dry_run"], json!(true));
        assert_eq!(params["version"], json!("v1.2"));
        assert_eq!(params["note"], json!("a=b"));
        assert!(!params.contains_key("release"));
    }

    #[test]
    fn test_extract_skips_empty_keys() {
        let params = extract_params("=oops env=");
        assert_eq!(params.len(), 1);
        assert_eq!(params["env"], json!(""));
    }

    #[test]
    fn test_structured_params_override_text() {
        let text = extract_params("env=staging service_id=1");
        let structured = json!({"env": "prod"}).as_object().cloned().unwrap();
        let merged = merge_params(text, &structured);
        assert_eq!(merged["env"], "prod");
        assert_eq!(merged["service_id"], 1);
    }
}
