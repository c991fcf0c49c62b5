//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL execution event log
    pub event_log: Option<String>,
    /// Directory for the rolling diagnostic log; stderr only when unset
    pub log_dir: Option<String>,
}
