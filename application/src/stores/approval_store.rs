use super::{read, write};
use crate::ports::clock::Clock;
use opsplane_domain::{
    ApprovalError, ApprovalTicket, ParamMap, ReviewDecision, TicketStatus, ToolMeta,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Table of approval tickets.
///
/// Expiry is lazy: any read through [`observe`](Self::observe),
/// [`confirm`](Self::confirm) or [`list_pending`](Self::list_pending) that
/// notices `now >= expires_at` records the ticket as expired. There is no
/// background sweep.
pub struct ApprovalTicketStore {
    tickets: RwLock<HashMap<String, ApprovalTicket>>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
}

impl ApprovalTicketStore {
    pub fn new(clock: Arc<dyn Clock>, ttl_ms: u64) -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            clock,
            ttl_ms,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Mint a pending ticket scoped to (tool, params, risk, mode, requester).
    pub fn create(&self, meta: &ToolMeta, params: &ParamMap, requester: &str) -> ApprovalTicket {
        let ticket = ApprovalTicket::new(
            uuid::Uuid::new_v4().to_string(),
            &meta.name,
            params.clone(),
            meta.risk,
            meta.mode,
            requester,
            self.now(),
            self.ttl_ms,
        );
        write(&self.tickets).insert(ticket.id.clone(), ticket.clone());
        info!(
            ticket = %ticket.id,
            tool = %ticket.tool,
            requester = %ticket.requester,
            "Approval ticket created"
        );
        ticket
    }

    /// Plain read. Does not apply expiry.
    pub fn get(&self, id: &str) -> Option<ApprovalTicket> {
        read(&self.tickets).get(id).cloned()
    }

    /// Read with lazy expiry applied.
    pub fn observe(&self, id: &str) -> Result<ApprovalTicket, ApprovalError> {
        let now = self.now();
        {
            let tickets = read(&self.tickets);
            let ticket = tickets
                .get(id)
                .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
            if !(ticket.status == TicketStatus::Pending && ticket.is_expired_at(now)) {
                return Ok(ticket.clone());
            }
        }
        let mut tickets = write(&self.tickets);
        let ticket = tickets
            .get_mut(id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        if ticket.expire_if_due(now) {
            debug!(ticket = %id, "Approval ticket expired");
        }
        Ok(ticket.clone())
    }

    /// Resolve a pending ticket.
    ///
    /// Fails on an overdue ticket and leaves it recorded as expired.
    pub fn confirm(
        &self,
        id: &str,
        decision: ReviewDecision,
        reviewer: &str,
    ) -> Result<ApprovalTicket, ApprovalError> {
        let now = self.now();
        let mut tickets = write(&self.tickets);
        let ticket = tickets
            .get_mut(id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        ticket.review(decision, reviewer, now)?;
        info!(
            ticket = %id,
            status = %ticket.status,
            reviewer = %reviewer,
            "Approval ticket resolved"
        );
        Ok(ticket.clone())
    }

    /// Pending tickets, oldest first. Overdue ones are expired on the way.
    pub fn list_pending(&self) -> Vec<ApprovalTicket> {
        let now = self.now();
        let mut tickets = write(&self.tickets);
        let mut pending: Vec<ApprovalTicket> = tickets
            .values_mut()
            .filter_map(|t| {
                t.expire_if_due(now);
                (t.status == TicketStatus::Pending).then(|| t.clone())
            })
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        pending
    }

    pub fn len(&self) -> usize {
        read(&self.tickets).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
