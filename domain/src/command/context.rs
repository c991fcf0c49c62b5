//! Command context and the persisted command record.

use super::action::{CommandAction, find_action};
use super::intent::{detect_intent, extract_params, merge_params};
use super::plan::{CommandPlan, CommandRisk, field_prompts, missing_fields, plan_hash};
use crate::approval::ApprovalError;
use crate::tool::ParamMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    #[error("command not found: {0}")]
    NotFound(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("execution requires confirm=true")]
    ConfirmationRequired,

    #[error("approval token required")]
    ApprovalTokenRequired { ticket_id: Option<String> },

    #[error("{0}")]
    Approval(#[from] ApprovalError),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("command execution failed: {0}")]
    Execution(String),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::UnknownIntent(_) => "unknown_intent",
            CommandError::NotFound(_) => "not_found",
            CommandError::MissingFields(_) => "missing_param",
            CommandError::ConfirmationRequired => "confirmation_required",
            CommandError::ApprovalTokenRequired { .. } => "approval_required",
            CommandError::Approval(_) | CommandError::PermissionDenied(_) => "policy_denied",
            CommandError::Execution(_) => "tool_error",
        }
    }
}

/// Everything the bridge knows about one command before it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandContext {
    pub command_id: String,
    pub trace_id: String,
    pub intent: String,
    pub text: String,
    pub params: ParamMap,
    pub missing: Vec<String>,
    pub prompts: BTreeMap<String, String>,
    pub plan: CommandPlan,
    pub plan_hash: String,
    pub action: CommandAction,
}

impl CommandContext {
    /// Route `text` (or the explicit `intent`) and derive params, plan and hash.
    pub fn build(
        command_id: impl Into<String>,
        trace_id: impl Into<String>,
        text: &str,
        intent: Option<&str>,
        structured: &ParamMap,
    ) -> Result<Self, CommandError> {
        let intent = match intent.map(str::trim).filter(|i| !i.is_empty()) {
            Some(explicit) => explicit,
            None => detect_intent(text),
        };
        let action = find_action(intent)
            .ok_or_else(|| CommandError::UnknownIntent(intent.to_string()))?
            .clone();

        let params = merge_params(extract_params(text), structured);
        let missing = missing_fields(&action, &params);
        let prompts = field_prompts(&missing);
        let plan = CommandPlan::for_action(&action, &params);
        let plan_hash = plan_hash(text, action.intent, &params);

        Ok(Self {
            command_id: command_id.into(),
            trace_id: trace_id.into(),
            intent: action.intent.to_string(),
            text: text.to_string(),
            params,
            missing,
            prompts,
            plan,
            plan_hash,
            action,
        })
    }

    pub fn risk(&self) -> CommandRisk {
        self.plan.risk
    }

    pub fn is_blocked(&self) -> bool {
        !self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    /// Required fields are missing
    Blocked,
    Previewed,
    Running,
    /// Refused at execute time (confirmation, permission or approval)
    Rejected,
    Succeeded,
    Failed,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Blocked => "blocked",
            CommandStatus::Previewed => "previewed",
            CommandStatus::Running => "running",
            CommandStatus::Rejected => "rejected",
            CommandStatus::Succeeded => "succeeded",
            CommandStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted history entry for a command, keyed by command id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command_id: String,
    pub intent: String,
    pub text: String,
    pub params: ParamMap,
    pub trace_id: String,
    pub plan_hash: String,
    pub risk: CommandRisk,
    pub status: CommandStatus,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_ticket: Option<String>,
    pub requester: String,
    /// Unix epoch milliseconds
    pub created_at: u64,
    pub updated_at: u64,
}

impl CommandRecord {
    pub fn from_context(
        ctx: &CommandContext,
        status: CommandStatus,
        requester: impl Into<String>,
        now: u64,
    ) -> Self {
        Self {
            command_id: ctx.command_id.clone(),
            intent: ctx.intent.clone(),
            text: ctx.text.clone(),
            params: ctx.params.clone(),
            trace_id: ctx.trace_id.clone(),
            plan_hash: ctx.plan_hash.clone(),
            risk: ctx.risk(),
            status,
            missing: ctx.missing.clone(),
            summary: None,
            result: None,
            approval_ticket: None,
            requester: requester.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
