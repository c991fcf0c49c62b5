//! Policy Gate: permission check plus approval enforcement.
//!
//! ```text
//! caller holds meta.permission? ──no──▶ policy_denied
//!        │ yes
//!        ▼
//! readonly? ──yes──▶ allow
//!        │ no
//!        ▼
//! token presented? ──no──▶ mint pending ticket ─▶ ApprovalRequired
//!        │ yes
//!        ▼
//! ticket exists, tool matches, owner or admin,
//! unexpired, approved? ──no──▶ policy_denied
//!        │ yes
//!        ▼
//!      allow
//! ```
//!
//! On success the gate performs no bookkeeping: the ticket is neither
//! consumed nor reclassified.

use crate::context::ExecutionContext;
use crate::stores::ApprovalTicketStore;
use opsplane_domain::{ParamMap, ToolError, ToolMeta, ToolMode};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct PolicyGate {
    tickets: Arc<ApprovalTicketStore>,
}

impl PolicyGate {
    pub fn new(tickets: Arc<ApprovalTicketStore>) -> Self {
        Self { tickets }
    }

    pub fn tickets(&self) -> &Arc<ApprovalTicketStore> {
        &self.tickets
    }

    pub fn check(
        &self,
        ctx: &ExecutionContext,
        meta: &ToolMeta,
        params: &ParamMap,
    ) -> Result<(), ToolError> {
        let caller = ctx.caller_id.as_str();
        let is_admin = ctx.is_admin();

        if !is_admin && !ctx.has_permission(&meta.permission) {
            warn!(caller = %caller, tool = %meta.name, permission = %meta.permission, "Permission denied");
            return Err(ToolError::PolicyDenied(format!(
                "{} lacks permission {} for {}",
                caller, meta.permission, meta.name
            )));
        }

        if meta.mode == ToolMode::Readonly {
            return Ok(());
        }

        let Some(token) = ctx.approval_token.as_deref() else {
            let ticket = self.tickets.create(meta, params, caller);
            return Err(ToolError::ApprovalRequired(ticket.required()));
        };

        let ticket = self
            .tickets
            .get(token)
            .ok_or_else(|| ToolError::PolicyDenied(format!("approval ticket not found: {}", token)))?;
        ticket
            .authorizes(&meta.name, caller, is_admin, self.tickets.now())
            .map_err(|e| {
                warn!(caller = %caller, tool = %meta.name, ticket = %token, error = %e, "Approval rejected");
                ToolError::PolicyDenied(e.to_string())
            })?;

        debug!(caller = %caller, tool = %meta.name, ticket = %token, "Approval accepted");
        Ok(())
    }
}
