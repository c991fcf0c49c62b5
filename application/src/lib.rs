//! Application layer for opsplane
//!
//! This crate contains use cases, port definitions, the process-wide stores
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod context;
pub mod ports;
pub mod stores;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{AggregateParams, ApprovalParams, EngineParams, PlaneConfig};
pub use context::ExecutionContext;
pub use ports::{
    clock::{Clock, SystemClock},
    cluster::{ClusterClient, ClusterClientResolver, ClusterError, PodSummary},
    execution_events::{ExecutionEvent, ExecutionEventSink, FanoutEventSink, NoExecutionEvents},
    ops_store::{OpsStore, StoreError},
    permission::{AllowAllPermissions, PermissionChecker},
    remote_executor::{RemoteExecError, RemoteExecutor},
    session_memory::{InMemorySessionMemory, SessionMemory},
    tool_registry::{ErasedTool, Tool, ToolRegistry},
};
pub use stores::{ApprovalTicketStore, ExecutionRecordStore};
pub use use_cases::command_bridge::{
    AggregateReport, CommandBridge, CommandPreview, CommandRequest, CommandSuggestion,
};
pub use use_cases::console::{AgentToolReply, ConsoleError, ConsoleService, ToolPreview};
pub use use_cases::execution_engine::{ExecutionEngine, ToolOutcome};
pub use use_cases::policy_gate::PolicyGate;
