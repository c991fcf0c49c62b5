//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod command_bridge;
pub mod console;
pub mod execution_engine;
pub mod policy_gate;
