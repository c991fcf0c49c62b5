//! `KEY=VALUE` argument parsing.

use opsplane_domain::ParamMap;
use opsplane_domain::command::coerce_value;

/// Parse `KEY=VALUE` pairs into a parameter map. Later keys win.
pub fn parse_params<S: AsRef<str>>(pairs: &[S]) -> Result<ParamMap, String> {
    let mut params = ParamMap::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{}'", pair));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty key in '{}'", pair));
        }
        params.insert(key.to_string(), coerce_value(value.trim()));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_are_coerced() {
        let params = parse_params(&["service_id=1", "firing=false", "env=prod"]).unwrap();
        assert_eq!(params["service_id"], json!(1));
        assert_eq!(params["firing"], json!(false));
        assert_eq!(params["env"], json!("prod"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let params = parse_params(&["command=echo a=b"]).unwrap();
        assert_eq!(params["command"], json!("echo a=b"));
    }

    #[test]
    fn test_malformed_pairs() {
        assert!(parse_params(&["target"]).is_err());
        assert!(parse_params(&["=web-1"]).is_err());
    }
}
