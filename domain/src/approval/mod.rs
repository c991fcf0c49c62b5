//! Approval tickets for mutating tools.
//!
//! # State Transitions
//!
//! ```text
//! Pending ──confirm(approve)──> Approved
//!    │    ──confirm(reject)───> Rejected
//!    └────now >= expires_at───> Expired   (applied lazily by whoever looks)
//! ```
//!
//! Approved, Rejected and Expired are terminal.

use crate::tool::{ApprovalRequired, ParamMap, RiskLevel, ToolMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tickets live for ten minutes unless configured otherwise.
pub const DEFAULT_TICKET_TTL_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TicketStatus::Pending)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reviewer's verdict on a pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApprovalError {
    #[error("approval ticket not found: {0}")]
    NotFound(String),

    #[error("approval ticket {id} is already {status}")]
    AlreadyResolved { id: String, status: TicketStatus },

    #[error("approval ticket {0} has expired")]
    Expired(String),

    #[error("caller {caller} may not review approvals (requires {permission})")]
    Forbidden { caller: String, permission: String },

    #[error("approval ticket rejected: {0}")]
    Invalid(String),
}

/// A time-boxed authorization record for one mutating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalTicket {
    pub id: String,
    pub tool: String,
    /// Parameters as they stood when the ticket was requested
    pub params: ParamMap,
    pub risk: RiskLevel,
    pub mode: ToolMode,
    pub status: TicketStatus,
    pub requester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    /// Unix epoch milliseconds
    pub created_at: u64,
    /// Unix epoch milliseconds
    pub expires_at: u64,
}

impl ApprovalTicket {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        tool: impl Into<String>,
        params: ParamMap,
        risk: RiskLevel,
        mode: ToolMode,
        requester: impl Into<String>,
        now: u64,
        ttl_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            params,
            risk,
            mode,
            status: TicketStatus::Pending,
            requester: requester.into(),
            reviewer: None,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    /// What a caller needs to know to get this ticket reviewed.
    pub fn required(&self) -> ApprovalRequired {
        ApprovalRequired {
            ticket_id: self.id.clone(),
            tool: self.tool.clone(),
            expires_at: self.expires_at,
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Reclassify a pending ticket whose deadline has passed.
    ///
    /// Returns `true` when the status changed.
    pub fn expire_if_due(&mut self, now: u64) -> bool {
        if self.status == TicketStatus::Pending && self.is_expired_at(now) {
            self.status = TicketStatus::Expired;
            return true;
        }
        false
    }

    /// Apply a reviewer's decision.
    ///
    /// An overdue pending ticket is marked expired and the decision fails.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        reviewer: impl Into<String>,
        now: u64,
    ) -> Result<(), ApprovalError> {
        if self.expire_if_due(now) {
            return Err(ApprovalError::Expired(self.id.clone()));
        }
        match self.status {
            TicketStatus::Pending => {}
            TicketStatus::Expired => return Err(ApprovalError::Expired(self.id.clone())),
            status => {
                return Err(ApprovalError::AlreadyResolved {
                    id: self.id.clone(),
                    status,
                });
            }
        }
        self.status = match decision {
            ReviewDecision::Approve => TicketStatus::Approved,
            ReviewDecision::Reject => TicketStatus::Rejected,
        };
        self.reviewer = Some(reviewer.into());
        Ok(())
    }

    /// Check this ticket authorizes `caller` to run `tool` at `now`.
    ///
    /// Pure check; never mutates the ticket.
    pub fn authorizes(
        &self,
        tool: &str,
        caller: &str,
        caller_is_admin: bool,
        now: u64,
    ) -> Result<(), ApprovalError> {
        if self.tool != tool {
            return Err(ApprovalError::Invalid(format!(
                "ticket {} was issued for {}, not {}",
                self.id, self.tool, tool
            )));
        }
        if self.requester != caller && !caller_is_admin {
            return Err(ApprovalError::Invalid(format!(
                "ticket {} belongs to {}",
                self.id, self.requester
            )));
        }
        if self.is_expired_at(now) {
            return Err(ApprovalError::Expired(self.id.clone()));
        }
        if self.status != TicketStatus::Approved {
            return Err(ApprovalError::Invalid(format!(
                "ticket {} is {}, not approved",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(now: u64) -> ApprovalTicket {
        ApprovalTicket::new(
            "t-1",
            "host_exec",
            ParamMap::new(),
            RiskLevel::High,
            ToolMode::Mutating,
            "alice",
            now,
            DEFAULT_TICKET_TTL_MS,
        )
    }

    #[test]
    fn test_required_carries_id_tool_and_expiry() {
        let required = ticket(1_000).required();
        assert_eq!(required.ticket_id, "t-1");
        assert_eq!(required.tool, "host_exec");
        assert_eq!(required.expires_at, 1_000 + DEFAULT_TICKET_TTL_MS);
    }

    #[test]
    fn test_new_ticket_is_pending_for_ten_minutes() {
        let t = ticket(1_000);
        assert_eq!(t.status, TicketStatus::Pending);
        assert_eq!(t.expires_at, 1_000 + 600_000);
        assert!(!t.is_expired_at(600_999));
        assert!(t.is_expired_at(601_000));
    }

    #[test]
    fn test_approve_then_no_further_transition() {
        let mut t = ticket(0);
        t.review(ReviewDecision::Approve, "bob", 10).unwrap();
        assert_eq!(t.status, TicketStatus::Approved);
        assert_eq!(t.reviewer.as_deref(), Some("bob"));

        let err = t.review(ReviewDecision::Reject, "bob", 20).unwrap_err();
        assert!(matches!(err, ApprovalError::AlreadyResolved { .. }));
        assert_eq!(t.status, TicketStatus::Approved);
    }

    #[test]
    fn test_review_after_expiry_records_expired() {
        let mut t = ticket(0);
        let err = t
            .review(ReviewDecision::Approve, "bob", DEFAULT_TICKET_TTL_MS)
            .unwrap_err();
        assert_eq!(err, ApprovalError::Expired("t-1".into()));
        assert_eq!(t.status, TicketStatus::Expired);
        assert!(t.reviewer.is_none());
    }

    #[test]
    fn test_approved_ticket_is_not_reclassified() {
        let mut t = ticket(0);
        t.review(ReviewDecision::Approve, "bob", 1).unwrap();
        assert!(!t.expire_if_due(DEFAULT_TICKET_TTL_MS * 2));
        assert_eq!(t.status, TicketStatus::Approved);
    }

    #[test]
    fn test_authorizes_checks() {
        let mut t = ticket(0);
        assert!(t.authorizes("host_exec", "alice", false, 5).is_err()); // pending

        t.review(ReviewDecision::Approve, "bob", 1).unwrap();
        assert!(t.authorizes("host_exec", "alice", false, 5).is_ok());
        assert!(t.authorizes("release_trigger", "alice", false, 5).is_err());
        assert!(t.authorizes("host_exec", "mallory", false, 5).is_err());
        assert!(t.authorizes("host_exec", "root", true, 5).is_ok());
        assert!(matches!(
            t.authorizes("host_exec", "alice", false, DEFAULT_TICKET_TTL_MS),
            Err(ApprovalError::Expired(_))
        ));
    }
}
