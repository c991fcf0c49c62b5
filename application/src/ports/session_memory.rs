//! Per-conversation parameter memory.
//!
//! Holds the parameters last used successfully for each tool name within one
//! conversation. A memory instance is handed to the engine through the
//! request context; there is no process-wide instance.

use opsplane_domain::ParamMap;
use std::collections::HashMap;
use std::sync::RwLock;

pub trait SessionMemory: Send + Sync {
    /// Last successful parameters for `tool`, if any.
    fn recall(&self, tool: &str) -> Option<ParamMap>;

    fn remember(&self, tool: &str, params: &ParamMap);
}

#[derive(Debug, Default)]
pub struct InMemorySessionMemory {
    by_tool: RwLock<HashMap<String, ParamMap>>,
}

impl InMemorySessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a tool's memory (builder pattern).
    pub fn with_entry(self, tool: &str, params: ParamMap) -> Self {
        self.remember(tool, &params);
        self
    }
}

impl SessionMemory for InMemorySessionMemory {
    fn recall(&self, tool: &str) -> Option<ParamMap> {
        self.by_tool.read().ok()?.get(tool).cloned()
    }

    fn remember(&self, tool: &str, params: &ParamMap) {
        if let Ok(mut map) = self.by_tool.write() {
            map.insert(tool.to_string(), params.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remember_replaces_previous() {
        let memory = InMemorySessionMemory::new();
        assert!(memory.recall("host_logs").is_none());

        memory.remember("host_logs", json!({"target": "a"}).as_object().unwrap());
        memory.remember("host_logs", json!({"target": "b"}).as_object().unwrap());

        assert_eq!(memory.recall("host_logs").unwrap()["target"], "b");
        assert!(memory.recall("cluster_pods").is_none());
    }
}
