//! Execution engine configuration from TOML (`[engine]` section)

use opsplane_application::EngineParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Deadline for one readonly attempt, in milliseconds
    pub readonly_deadline_ms: u64,
    /// Deadline for one mutating attempt, in milliseconds
    pub mutating_deadline_ms: u64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let defaults = EngineParams::default();
        Self {
            readonly_deadline_ms: defaults.readonly_deadline.as_millis() as u64,
            mutating_deadline_ms: defaults.mutating_deadline.as_millis() as u64,
        }
    }
}

impl FileEngineConfig {
    pub fn to_engine_params(&self) -> EngineParams {
        EngineParams::default()
            .with_readonly_deadline(Duration::from_millis(self.readonly_deadline_ms))
            .with_mutating_deadline(Duration::from_millis(self.mutating_deadline_ms))
    }
}
