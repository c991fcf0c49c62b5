//! Execution engine parameters.

use opsplane_domain::ToolMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadlines for one tool attempt, by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    pub readonly_deadline: Duration,
    pub mutating_deadline: Duration,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            readonly_deadline: Duration::from_secs(8),
            mutating_deadline: Duration::from_secs(20),
        }
    }
}

impl EngineParams {
    pub fn deadline_for(&self, mode: ToolMode) -> Duration {
        match mode {
            ToolMode::Readonly => self.readonly_deadline,
            ToolMode::Mutating => self.mutating_deadline,
        }
    }

    pub fn with_readonly_deadline(mut self, deadline: Duration) -> Self {
        self.readonly_deadline = deadline;
        self
    }

    pub fn with_mutating_deadline(mut self, deadline: Duration) -> Self {
        self.mutating_deadline = deadline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadlines() {
        let params = EngineParams::default();
        assert_eq!(params.deadline_for(ToolMode::Readonly), Duration::from_secs(8));
        assert_eq!(params.deadline_for(ToolMode::Mutating), Duration::from_secs(20));
    }

    #[test]
    fn test_builder() {
        let params = EngineParams::default().with_readonly_deadline(Duration::from_millis(50));
        assert_eq!(params.deadline_for(ToolMode::Readonly), Duration::from_millis(50));
    }
}
