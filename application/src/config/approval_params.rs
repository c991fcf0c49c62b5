use opsplane_domain::DEFAULT_TICKET_TTL_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Permission a reviewer must hold to confirm tickets.
pub const DEFAULT_REVIEW_PERMISSION: &str = "approval:review";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalParams {
    pub ticket_ttl: Duration,
    pub review_permission: String,
}

impl Default for ApprovalParams {
    fn default() -> Self {
        Self {
            ticket_ttl: Duration::from_millis(DEFAULT_TICKET_TTL_MS),
            review_permission: DEFAULT_REVIEW_PERMISSION.to_string(),
        }
    }
}

impl ApprovalParams {
    pub fn ttl_ms(&self) -> u64 {
        self.ticket_ttl.as_millis() as u64
    }

    pub fn with_ticket_ttl(mut self, ttl: Duration) -> Self {
        self.ticket_ttl = ttl;
        self
    }
}
