//! Console service: the endpoint surface of the control plane.
//!
//! One façade per deployment, shared behind an `Arc` by every transport
//! (HTTP handlers, the REPL, the conversational agent). Two paths reach the
//! engine and they treat `approval_required` differently:
//!
//! - [`execute_tool`](ConsoleService::execute_tool) records an
//!   [`ExecutionRecord`]; a missing approval is a failed record.
//! - [`agent_call_tool`](ConsoleService::agent_call_tool) emits an inline
//!   `approval_required` event and hands the pending ticket back to the
//!   conversation, which carries on.

use crate::config::{ApprovalParams, PlaneConfig};
use crate::context::ExecutionContext;
use crate::ports::clock::Clock;
use crate::ports::execution_events::ExecutionEvent;
use crate::ports::ops_store::OpsStore;
use crate::ports::tool_registry::ToolRegistry;
use crate::stores::{ApprovalTicketStore, ExecutionRecordStore};
use crate::use_cases::command_bridge::{
    CommandBridge, CommandPreview, CommandRequest, CommandSuggestion,
};
use crate::use_cases::execution_engine::ExecutionEngine;
use crate::use_cases::policy_gate::PolicyGate;
use opsplane_domain::{
    ApprovalError, ApprovalRequired, ApprovalTicket, CommandError, CommandRecord, ExecutionRecord,
    ParamMap, ParameterResolver, ResolutionTrace, ReviewDecision, RiskLevel, ToolMeta, ToolMode,
    ToolResult,
};
use opsplane_domain::tool::is_empty_value;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ConsoleError {
    /// Machine-readable code, aligned with the tool error codes.
    pub fn code(&self) -> &'static str {
        match self {
            ConsoleError::UnknownTool(_) | ConsoleError::InvalidRequest(_) => "invalid_param",
            ConsoleError::PermissionDenied(_) | ConsoleError::Approval(_) => "policy_denied",
            ConsoleError::ExecutionNotFound(_) => "not_found",
            ConsoleError::Command(e) => e.code(),
        }
    }
}

/// What a tool call would run with, without running it.
#[derive(Debug, Clone, Serialize)]
pub struct ToolPreview {
    pub tool: String,
    pub mode: ToolMode,
    pub risk: RiskLevel,
    pub resolution: ResolutionTrace,
    /// Required fields still empty after resolution.
    pub missing: Vec<String>,
    pub requires_approval: bool,
    /// Pending ticket minted for a mutating tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRequired>,
}

/// Reply to the conversational agent for one tool call.
#[derive(Debug, Clone, Serialize)]
pub struct AgentToolReply {
    pub result: ToolResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRequired>,
}

pub struct ConsoleService {
    engine: Arc<ExecutionEngine>,
    records: Arc<ExecutionRecordStore>,
    bridge: CommandBridge,
    approval: ApprovalParams,
}

impl ConsoleService {
    pub fn new(
        engine: Arc<ExecutionEngine>,
        records: Arc<ExecutionRecordStore>,
        bridge: CommandBridge,
        approval: ApprovalParams,
    ) -> Self {
        Self {
            engine,
            records,
            bridge,
            approval,
        }
    }

    /// Wire stores, gate, engine and bridge from one configuration.
    pub fn assemble(
        registry: ToolRegistry,
        ops: Arc<dyn OpsStore>,
        clock: Arc<dyn Clock>,
        config: &PlaneConfig,
    ) -> Self {
        let tickets = Arc::new(ApprovalTicketStore::new(
            Arc::clone(&clock),
            config.approval.ttl_ms(),
        ));
        let records = Arc::new(ExecutionRecordStore::new(clock));
        let engine = Arc::new(ExecutionEngine::new(
            Arc::new(registry),
            Arc::new(PolicyGate::new(tickets)),
            config.engine.clone(),
        ));
        let bridge = CommandBridge::new(
            Arc::clone(&engine),
            Arc::clone(&records),
            ops,
            config.aggregate.clone(),
        );
        Self::new(engine, records, bridge, config.approval.clone())
    }

    pub fn tickets(&self) -> &Arc<ApprovalTicketStore> {
        self.engine.gate().tickets()
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.engine.registry()
    }

    pub fn bridge(&self) -> &CommandBridge {
        &self.bridge
    }

    // ==================== Tools ====================

    /// Tools the caller may invoke, sorted by name.
    pub fn list_capabilities(&self, ctx: &ExecutionContext) -> Vec<ToolMeta> {
        self.registry()
            .visible_to(ctx.permissions.as_ref(), &ctx.caller_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Resolve and decode a call without running it.
    ///
    /// A mutating tool gets a pending ticket so the review can happen before
    /// the call. Input that does not decode is rejected before any ticket is
    /// minted.
    pub fn preview_tool(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        params: &ParamMap,
    ) -> Result<ToolPreview, ConsoleError> {
        let meta = self.permitted_meta(ctx, tool)?;
        let resolution =
            ParameterResolver.resolve(&ctx.resolution_sources(&meta.name), &meta, params, None);
        let missing: Vec<String> = meta
            .required
            .iter()
            .filter(|field| is_empty_value(resolution.resolved.get(field.as_str())))
            .cloned()
            .collect();

        if missing.is_empty() {
            let handle = self
                .registry()
                .get(&meta.name)
                .ok_or_else(|| ConsoleError::UnknownTool(meta.name.clone()))?;
            let _ = handle
                .bind(&resolution.resolved, CancellationToken::new())
                .map_err(|e| ConsoleError::InvalidRequest(e.to_string()))?;
        }

        let approval = (meta.mode == ToolMode::Mutating).then(|| {
            self.tickets()
                .create(&meta, &resolution.resolved, &ctx.caller_id)
                .required()
        });
        Ok(ToolPreview {
            tool: meta.name.clone(),
            mode: meta.mode,
            risk: meta.risk,
            requires_approval: meta.mode == ToolMode::Mutating,
            resolution,
            missing,
            approval,
        })
    }

    /// Run a tool and record it. The record is returned whatever the outcome.
    pub async fn execute_tool(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        params: ParamMap,
    ) -> ExecutionRecord {
        let mode = self
            .registry()
            .meta(tool)
            .map_or(ToolMode::Readonly, |meta| meta.mode);
        let started = self
            .records
            .start_execution(tool, &params, mode, &ctx.caller_id);

        let outcome = self.engine.run(ctx, tool, params).await;
        if let Some(required) = outcome.approval_required() {
            warn!(execution = %started.id, ticket = %required.ticket_id, "Execution needs approval");
        }

        match self.records.finish_execution(
            &started.id,
            outcome.params.clone(),
            outcome.result.clone(),
        ) {
            Some(record) => record,
            None => {
                let mut record = started;
                record.finish(outcome.params, outcome.result, self.records.now());
                record
            }
        }
    }

    pub fn get_execution(&self, id: &str) -> Result<ExecutionRecord, ConsoleError> {
        self.records
            .get_execution(id)
            .ok_or_else(|| ConsoleError::ExecutionNotFound(id.to_string()))
    }

    /// Conversational path: approval required is reported inline, not raised.
    pub async fn agent_call_tool(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        params: ParamMap,
    ) -> AgentToolReply {
        let outcome = self.engine.run(ctx, tool, params).await;
        let approval = outcome.approval_required().cloned();
        if let Some(required) = &approval {
            ctx.emit(ExecutionEvent::ApprovalRequired {
                trace_id: ctx.trace_id.clone(),
                tool: required.tool.clone(),
                ticket_id: required.ticket_id.clone(),
                expires_at: required.expires_at,
            });
        }
        AgentToolReply {
            result: outcome.result,
            approval,
        }
    }

    // ==================== Approvals ====================

    /// Mint a pending ticket for a mutating tool ahead of the call.
    pub fn create_approval(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        params: &ParamMap,
    ) -> Result<ApprovalTicket, ConsoleError> {
        let meta = self.permitted_meta(ctx, tool)?;
        if meta.mode == ToolMode::Readonly {
            return Err(ConsoleError::InvalidRequest(format!(
                "{} is readonly and needs no approval",
                meta.name
            )));
        }
        Ok(self.tickets().create(&meta, params, &ctx.caller_id))
    }

    pub fn confirm_approval(
        &self,
        ctx: &ExecutionContext,
        ticket_id: &str,
        decision: ReviewDecision,
    ) -> Result<ApprovalTicket, ConsoleError> {
        let permission = &self.approval.review_permission;
        if !ctx.is_admin() && !ctx.has_permission(permission) {
            warn!(caller = %ctx.caller_id, ticket = %ticket_id, "Approval review denied");
            return Err(ApprovalError::Forbidden {
                caller: ctx.caller_id.clone(),
                permission: permission.clone(),
            }
            .into());
        }
        Ok(self.tickets().confirm(ticket_id, decision, &ctx.caller_id)?)
    }

    pub fn get_approval(&self, ticket_id: &str) -> Result<ApprovalTicket, ConsoleError> {
        Ok(self.tickets().observe(ticket_id)?)
    }

    pub fn pending_approvals(&self) -> Vec<ApprovalTicket> {
        self.tickets().list_pending()
    }

    // ==================== Commands ====================

    pub fn command_suggestions(&self, text: &str) -> Vec<CommandSuggestion> {
        self.bridge.suggestions(text)
    }

    pub fn command_preview(
        &self,
        ctx: &ExecutionContext,
        request: &CommandRequest,
    ) -> Result<CommandPreview, ConsoleError> {
        Ok(self.bridge.preview(ctx, request)?)
    }

    pub async fn command_execute(
        &self,
        ctx: &ExecutionContext,
        request: &CommandRequest,
    ) -> Result<CommandRecord, ConsoleError> {
        Ok(self.bridge.execute(ctx, request).await?)
    }

    pub fn command_history(&self, limit: usize) -> Vec<CommandRecord> {
        self.bridge.history(limit)
    }

    pub fn command_get(&self, command_id: &str) -> Result<CommandRecord, ConsoleError> {
        Ok(self.bridge.get(command_id)?)
    }

    fn permitted_meta(&self, ctx: &ExecutionContext, tool: &str) -> Result<ToolMeta, ConsoleError> {
        let meta = self
            .registry()
            .meta(tool)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownTool(tool.to_string()))?;
        if !ctx.is_admin() && !ctx.has_permission(&meta.permission) {
            info!(caller = %ctx.caller_id, tool = %tool, "Tool not visible to caller");
            return Err(ConsoleError::PermissionDenied(format!(
                "{} lacks permission {} for {}",
                ctx.caller_id, meta.permission, meta.name
            )));
        }
        Ok(meta)
    }
}
