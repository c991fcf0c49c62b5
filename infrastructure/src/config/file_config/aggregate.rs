//! Aggregate intent configuration from TOML (`[aggregate]` section)

use opsplane_application::AggregateParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw aggregate configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAggregateConfig {
    pub max_parallel: usize,
    pub timeout_secs: u64,
    /// Upper bound for caller-supplied `timeout_sec`
    pub max_timeout_secs: u64,
    /// Rows per domain
    pub limit: usize,
}

impl Default for FileAggregateConfig {
    fn default() -> Self {
        let defaults = AggregateParams::default();
        Self {
            max_parallel: defaults.max_parallel,
            timeout_secs: defaults.timeout.as_secs(),
            max_timeout_secs: defaults.max_timeout.as_secs(),
            limit: defaults.limit,
        }
    }
}

impl FileAggregateConfig {
    pub fn to_aggregate_params(&self) -> AggregateParams {
        AggregateParams {
            max_parallel: self.max_parallel.max(1),
            timeout: Duration::from_secs(self.timeout_secs),
            max_timeout: Duration::from_secs(self.max_timeout_secs.max(self.timeout_secs)),
            limit: self.limit.max(1),
        }
    }
}
