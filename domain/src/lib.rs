//! Domain layer for opsplane
//!
//! Pure types and rules of the action execution control plane. No I/O, no
//! clocks, no locks: callers pass `now` in and persist results elsewhere.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, schema-described operation, readonly or mutating
//! - **Resolution**: filling empty parameters from hints, memory and defaults
//! - **Approval ticket**: time-boxed authorization for one mutating call
//! - **Command**: free text routed to a declared action with a fingerprinted plan

pub mod access;
pub mod approval;
pub mod command;
pub mod execution;
pub mod resolution;
pub mod tool;

// Re-export commonly used types
pub use access::{WILDCARD_ALL, any_grant_satisfies, permission_satisfies};
pub use approval::{
    ApprovalError, ApprovalTicket, DEFAULT_TICKET_TTL_MS, ReviewDecision, TicketStatus,
};
pub use command::{
    CommandAction, CommandContext, CommandError, CommandPlan, CommandRecord, CommandRisk,
    CommandStatus, CustomExecutor,
};
pub use execution::{ExecutionRecord, ExecutionStatus};
pub use resolution::{ParamSource, ParameterResolver, ResolutionSources, ResolutionTrace};
pub use tool::{
    ApprovalRequired, ErrorCode, ParamMap, RiskLevel, ToolCall, ToolError, ToolMeta, ToolMode,
    ToolResult, ToolSpec, deserialize_opt_text, deserialize_text, param_bool, param_i64,
    param_text,
};
