//! Store and cluster configuration from TOML (`[store]`, `[cluster]` sections)

use serde::{Deserialize, Serialize};

/// Raw store configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// JSON file the in-memory ops store is seeded from
    pub seed_file: Option<String>,
}

/// Raw cluster configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClusterConfig {
    /// Cluster used when a call names none, or an unknown one
    pub default: Option<String>,
}

impl Default for FileClusterConfig {
    fn default() -> Self {
        Self {
            default: Some("local".to_string()),
        }
    }
}
