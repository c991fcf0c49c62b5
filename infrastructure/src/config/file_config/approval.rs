//! Approval ticket configuration from TOML (`[approval]` section)

use opsplane_application::ApprovalParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw approval configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApprovalConfig {
    /// Ticket lifetime in seconds
    pub ticket_ttl_secs: u64,
    /// Permission code a reviewer must hold
    pub review_permission: String,
}

impl Default for FileApprovalConfig {
    fn default() -> Self {
        let defaults = ApprovalParams::default();
        Self {
            ticket_ttl_secs: defaults.ticket_ttl.as_secs(),
            review_permission: defaults.review_permission,
        }
    }
}

impl FileApprovalConfig {
    pub fn to_approval_params(&self) -> ApprovalParams {
        ApprovalParams {
            ticket_ttl: Duration::from_secs(self.ticket_ttl_secs),
            review_permission: self.review_permission.trim().to_string(),
        }
    }
}
