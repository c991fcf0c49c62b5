//! Tool domain module
//!
//! Static contracts for the operational **Tool System**: what a tool is
//! ([`ToolMeta`]), how callers pass it parameters ([`ParamMap`]), and the
//! vocabulary every invocation ends in ([`ToolResult`], [`ToolError`]).
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolMeta     │───▶│ ParamMap     │───▶│ ToolResult   │
//! │ (registry)   │    │ (resolved)   │    │ (always)     │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Mode and risk
//!
//! | Mode | Approval | Examples |
//! |------|----------|----------|
//! | **readonly** | never | `host_logs`, `service_status`, `cluster_pods` |
//! | **mutating** | ticket required | `host_exec`, `release_trigger`, `release_rollback` |
//!
//! Risk (`low` / `medium` / `high`) is carried on the ticket and drives how
//! strictly the command bridge treats an intent.
//!
//! The executable half of a tool (its typed input and body) lives in the
//! application layer; this module is pure data.

pub mod entities;
pub mod params;
pub mod value_objects;

pub use entities::{RiskLevel, ToolCall, ToolMeta, ToolMode, ToolSpec};
pub use params::{
    ParamMap, canonical_json, deserialize_opt_text, deserialize_text, is_empty_value, param_bool,
    param_i64, param_text, value_as_text,
};
pub use value_objects::{ApprovalRequired, ErrorCode, ToolError, ToolResult};
