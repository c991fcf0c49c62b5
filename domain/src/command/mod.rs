//! Command routing domain
//!
//! Maps free text plus optional structured parameters onto a declared
//! [`CommandAction`]:
//!
//! ```text
//! "rollback checkout env=prod"
//!        │ detect_intent (keyword priority)
//!        ▼
//! deployment.rollback ──▶ extract_params + merge ──▶ missing_fields
//!        │                                               │
//!        ▼                                               ▼
//! CommandPlan (steps + risk)                 plan_hash(text|intent|params)
//! ```

pub mod action;
pub mod context;
pub mod intent;
pub mod plan;

pub use action::{CommandAction, CustomExecutor, command_actions, find_action};
pub use context::{CommandContext, CommandError, CommandRecord, CommandStatus};
pub use intent::{coerce_value, detect_intent, extract_params, matching_intents, merge_params};
pub use plan::{CommandPlan, CommandRisk, PlanStep, classify_risk, plan_hash};
