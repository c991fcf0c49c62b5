//! Execution records: the persisted history of tool invocations.
//!
//! ```text
//! Running ──> Succeeded
//!        └──> Failed
//! ```
//!
//! `finished_at` is written together with the terminal status and never again.

use crate::tool::{ParamMap, ToolMode, ToolResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    /// Tool name or command id
    pub tool: String,
    pub params: ParamMap,
    pub mode: ToolMode,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    pub requester: String,
    /// Unix epoch milliseconds
    pub created_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
}

impl ExecutionRecord {
    pub fn start(
        id: impl Into<String>,
        tool: impl Into<String>,
        params: ParamMap,
        mode: ToolMode,
        requester: impl Into<String>,
        now: u64,
    ) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            params,
            mode,
            status: ExecutionStatus::Running,
            result: None,
            requester: requester.into(),
            created_at: now,
            finished_at: None,
        }
    }

    /// Move to the terminal status implied by `result`.
    ///
    /// Returns `false` (and changes nothing) if the record already finished.
    pub fn finish(&mut self, params: ParamMap, result: ToolResult, now: u64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = if result.ok {
            ExecutionStatus::Succeeded
        } else {
            ExecutionStatus::Failed
        };
        self.params = params;
        self.result = Some(result);
        self.finished_at = Some(now);
        true
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at.map(|f| f.saturating_sub(self.created_at))
    }
}
