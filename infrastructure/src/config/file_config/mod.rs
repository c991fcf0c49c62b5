//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application parameter
//! groups with [`FileConfig::to_plane_config`].

mod access;
mod aggregate;
mod approval;
mod engine;
mod logging;
mod store;

pub use access::FileAccessConfig;
pub use aggregate::FileAggregateConfig;
pub use approval::FileApprovalConfig;
pub use engine::FileEngineConfig;
pub use logging::FileLoggingConfig;
pub use store::{FileClusterConfig, FileStoreConfig};

use opsplane_application::PlaneConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted key the issue is about, e.g. `engine.readonly_deadline_ms`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Per-mode attempt deadlines
    pub engine: FileEngineConfig,
    /// Ticket TTL and review permission
    pub approval: FileApprovalConfig,
    /// Admins and permission grants
    pub access: FileAccessConfig,
    /// Aggregate intent defaults
    pub aggregate: FileAggregateConfig,
    /// Ops store seed
    pub store: FileStoreConfig,
    /// Default cluster
    pub cluster: FileClusterConfig,
    /// Event log and diagnostic log locations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn to_plane_config(&self) -> PlaneConfig {
        PlaneConfig {
            engine: self.engine.to_engine_params(),
            approval: self.approval.to_approval_params(),
            aggregate: self.aggregate.to_aggregate_params(),
        }
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.engine.readonly_deadline_ms == 0 {
            issues.push(ConfigIssue::error(
                "engine.readonly_deadline_ms",
                "readonly deadline cannot be 0",
            ));
        }
        if self.engine.mutating_deadline_ms == 0 {
            issues.push(ConfigIssue::error(
                "engine.mutating_deadline_ms",
                "mutating deadline cannot be 0",
            ));
        }
        if self.approval.ticket_ttl_secs == 0 {
            issues.push(ConfigIssue::error(
                "approval.ticket_ttl_secs",
                "tickets would expire on creation",
            ));
        }
        if !self.approval.review_permission.contains(':') {
            issues.push(ConfigIssue::error(
                "approval.review_permission",
                format!(
                    "'{}' is not a resource:action permission code",
                    self.approval.review_permission
                ),
            ));
        }
        if self.aggregate.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "aggregate.timeout_secs",
                "aggregate timeout cannot be 0",
            ));
        }
        if self.aggregate.max_timeout_secs < self.aggregate.timeout_secs {
            issues.push(ConfigIssue::warning(
                "aggregate.max_timeout_secs",
                format!(
                    "max_timeout_secs ({}) is below timeout_secs ({}); raised to match",
                    self.aggregate.max_timeout_secs, self.aggregate.timeout_secs
                ),
            ));
        }

        for (caller, code) in self.access.malformed_grants() {
            issues.push(ConfigIssue::warning(
                &format!("access.grants.{}", caller),
                format!("grant '{}' can never match a permission code", code),
            ));
        }

        if let Some(seed) = &self.store.seed_file
            && !Path::new(seed).exists()
        {
            issues.push(ConfigIssue::warning(
                "store.seed_file",
                format!("seed file {} does not exist; starting empty", seed),
            ));
        }

        issues
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
readonly_deadline_ms = 5000
mutating_deadline_ms = 30000

[approval]
ticket_ttl_secs = 300
review_permission = "release:review"

[access]
admins = ["root"]

[access.grants]
alice = ["host:read", "deployment:*"]

[aggregate]
max_parallel = 4
limit = 10

[store]
seed_file = "ops-seed.json"

[logging]
event_log = "events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.readonly_deadline_ms, 5_000);
        assert_eq!(config.approval.review_permission, "release:review");
        assert_eq!(config.access.grants["alice"].len(), 2);
        assert_eq!(config.aggregate.max_parallel, 4);
        assert_eq!(config.aggregate.timeout_secs, 5);
        assert_eq!(config.store.seed_file.as_deref(), Some("ops-seed.json"));
        assert_eq!(config.cluster.default.as_deref(), Some("local"));
    }

    #[test]
    fn test_to_plane_config() {
        let config: FileConfig = toml::from_str(
            r#"
[engine]
readonly_deadline_ms = 1500

[approval]
ticket_ttl_secs = 60

[aggregate]
timeout_secs = 40
max_timeout_secs = 30
"#,
        )
        .unwrap();

        let plane = config.to_plane_config();
        assert_eq!(plane.engine.readonly_deadline, Duration::from_millis(1_500));
        assert_eq!(plane.engine.mutating_deadline, Duration::from_secs(20));
        assert_eq!(plane.approval.ttl_ms(), 60_000);
        assert_eq!(plane.aggregate.max_timeout, Duration::from_secs(40));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.to_plane_config().engine, Default::default());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let config: FileConfig = toml::from_str(
            r#"
[engine]
readonly_deadline_ms = 0

[approval]
review_permission = "review"

[access.grants]
bob = ["*:read", "host:read", "deployment"]
"#,
        )
        .unwrap();

        let issues = config.validate();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "engine.readonly_deadline_ms",
                "approval.review_permission",
                "access.grants.bob",
                "access.grants.bob",
            ]
        );
        assert!(FileConfig::has_errors(&issues));
    }
}
