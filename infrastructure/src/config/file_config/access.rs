//! Access control configuration from TOML (`[access]` section)
//!
//! ```toml
//! [access]
//! admins = ["root"]
//!
//! [access.grants]
//! alice = ["host:read", "deployment:*"]
//! carol = ["approval:review"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw access configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAccessConfig {
    /// Callers that bypass every permission check
    pub admins: Vec<String>,
    /// Caller id → granted permission codes
    pub grants: BTreeMap<String, Vec<String>>,
}

/// Without an `[access]` section the local `operator` is the only caller.
impl Default for FileAccessConfig {
    fn default() -> Self {
        Self {
            admins: vec!["operator".to_string()],
            grants: BTreeMap::new(),
        }
    }
}

impl FileAccessConfig {
    /// Grants that can never match: no `resource:action` shape, or a partial wildcard.
    pub fn malformed_grants(&self) -> Vec<(String, String)> {
        self.grants
            .iter()
            .flat_map(|(caller, codes)| codes.iter().map(move |code| (caller, code)))
            .filter(|(_, code)| match code.trim().split_once(':') {
                Some((resource, action)) => {
                    resource.is_empty()
                        || action.is_empty()
                        || (resource == "*" && action != "*")
                }
                None => true,
            })
            .map(|(caller, code)| (caller.clone(), code.clone()))
            .collect()
    }
}
