//! Parameter resolution
//!
//! Fills empty parameter keys from layered sources so operators and agents
//! can omit what the conversation already established.
//!
//! | Priority | Source | Example |
//! |---------:|--------|---------|
//! | 1 | runtime hints (conversation scope) | `cluster_id` picked in the UI |
//! | 2 | session memory (last success for this tool) | previous `namespace` |
//! | 3 | tool default hints ([`ToolMeta::default_hints`](crate::tool::ToolMeta::default_hints)) | `tail_lines = 100` |
//! | 4 | safety defaults | `target = localhost` |
//!
//! A non-empty caller value is never replaced.

mod resolver;

pub use resolver::{
    ParamSource, ParameterResolver, ResolutionSources, ResolutionTrace, RUNTIME_HINT_KEYS,
    safety_defaults,
};
