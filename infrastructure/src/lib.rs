//! Infrastructure layer for opsplane
//!
//! Adapters for the ports defined in the application layer: the built-in
//! tools, the in-memory ops store, cluster clients, the host command runner,
//! static permission grants, configuration loading and the JSONL event log.

pub mod access;
pub mod cluster;
pub mod config;
pub mod logging;
pub mod runner;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use access::StaticPermissionProvider;
pub use cluster::{ClusterRegistry, StaticClusterClient};
pub use config::{ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use logging::JsonlEventSink;
pub use runner::HostCommandRunner;
pub use store::{InMemoryOpsStore, OpsSeed, SeedError};
pub use tools::{ToolDeps, default_tool_registry};
