//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod clock;
pub mod cluster;
pub mod execution_events;
pub mod ops_store;
pub mod permission;
pub mod remote_executor;
pub mod session_memory;
pub mod tool_registry;
