//! Application-level configuration.
//!
//! Parameter groups that control how the use cases behave:
//!
//! - [`EngineParams`]: per-mode deadlines for tool attempts
//! - [`ApprovalParams`]: ticket TTL and the review permission
//! - [`AggregateParams`]: defaults and clamps for the aggregate intent
//! - [`PlaneConfig`]: container handed to the console service

pub mod aggregate_params;
pub mod approval_params;
pub mod engine_params;

pub use aggregate_params::AggregateParams;
pub use approval_params::ApprovalParams;
pub use engine_params::EngineParams;

/// All application parameter groups, built by the infrastructure config layer.
#[derive(Debug, Clone, Default)]
pub struct PlaneConfig {
    pub engine: EngineParams,
    pub approval: ApprovalParams,
    pub aggregate: AggregateParams,
}
