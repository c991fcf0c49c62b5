//! Tool domain value objects: the shared result and error vocabulary.
//!
//! Every code path that runs a tool ends in a [`ToolResult`]; failures carry
//! a machine-readable [`ErrorCode`] so callers never have to parse messages.
//!
//! | Category | Codes | Retried? |
//! |----------|-------|----------|
//! | Input validation | `missing_param`, `invalid_param`, `param_conflict` | `missing_param` once |
//! | Authorization | `policy_denied` | No |
//! | Approval state | `approval_required` | No (caller obtains a ticket) |
//! | Execution-time | `tool_panic`, `tool_timeout`, `tool_canceled`, `tool_error` | No |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code carried by every failed [`ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingParam,
    InvalidParam,
    ParamConflict,
    PolicyDenied,
    ApprovalRequired,
    ToolPanic,
    ToolTimeout,
    ToolCanceled,
    ToolError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingParam => "missing_param",
            ErrorCode::InvalidParam => "invalid_param",
            ErrorCode::ParamConflict => "param_conflict",
            ErrorCode::PolicyDenied => "policy_denied",
            ErrorCode::ApprovalRequired => "approval_required",
            ErrorCode::ToolPanic => "tool_panic",
            ErrorCode::ToolTimeout => "tool_timeout",
            ErrorCode::ToolCanceled => "tool_canceled",
            ErrorCode::ToolError => "tool_error",
        }
    }

    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::MissingParam | ErrorCode::InvalidParam | ErrorCode::ParamConflict
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// "Not yet permitted": a mutating call was attempted without an approved
/// ticket, and a fresh pending ticket was minted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequired {
    pub ticket_id: String,
    pub tool: String,
    /// Expiry as unix epoch milliseconds
    pub expires_at: u64,
}

/// Error raised while resolving, authorizing or running a tool.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("missing required parameter: {field}")]
    MissingParam { field: String },

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("conflicting parameters: {0}")]
    ParamConflict(String),

    #[error("policy denied: {0}")]
    PolicyDenied(String),

    #[error("approval required for {} (ticket {})", .0.tool, .0.ticket_id)]
    ApprovalRequired(ApprovalRequired),

    #[error("tool panicked: {0}")]
    Panic(String),

    #[error("tool timed out: {0}")]
    Timeout(String),

    #[error("tool canceled: {0}")]
    Canceled(String),

    #[error("tool failed: {0}")]
    Failed(String),

    /// Raw failure text from a collaborator; reclassified by [`ToolError::classify`].
    #[error("{0}")]
    Untyped(String),
}

impl ToolError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingParam {
            field: field.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::MissingParam { .. } => ErrorCode::MissingParam,
            ToolError::InvalidParam(_) => ErrorCode::InvalidParam,
            ToolError::ParamConflict(_) => ErrorCode::ParamConflict,
            ToolError::PolicyDenied(_) => ErrorCode::PolicyDenied,
            ToolError::ApprovalRequired(_) => ErrorCode::ApprovalRequired,
            ToolError::Panic(_) => ErrorCode::ToolPanic,
            ToolError::Timeout(_) => ErrorCode::ToolTimeout,
            ToolError::Canceled(_) => ErrorCode::ToolCanceled,
            ToolError::Failed(_) | ToolError::Untyped(_) => ErrorCode::ToolError,
        }
    }

    /// Reclassify an untyped error by sniffing its text for timeout or
    /// cancellation; typed errors pass through unchanged.
    pub fn classify(self) -> Self {
        match self {
            ToolError::Untyped(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("timeout") || lower.contains("timed out") {
                    ToolError::Timeout(msg)
                } else if lower.contains("canceled") || lower.contains("cancelled") {
                    ToolError::Canceled(msg)
                } else {
                    ToolError::Failed(msg)
                }
            }
            typed => typed,
        }
    }

    pub fn missing_field(&self) -> Option<&str> {
        match self {
            ToolError::MissingParam { field } => Some(field),
            _ => None,
        }
    }

    pub fn approval(&self) -> Option<&ApprovalRequired> {
        match self {
            ToolError::ApprovalRequired(required) => Some(required),
            _ => None,
        }
    }
}

/// Outcome of one tool invocation. Always produced, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Opaque payload produced by the tool body
    #[serde(default)]
    pub data: serde_json::Value,
    /// Label of whatever produced the result (tool name or command intent)
    pub source: String,
    pub latency_ms: u64,
}

impl ToolResult {
    pub fn success(source: impl Into<String>, data: serde_json::Value, latency_ms: u64) -> Self {
        Self {
            ok: true,
            error_code: None,
            error_message: None,
            data,
            source: source.into(),
            latency_ms,
        }
    }

    pub fn failure(source: impl Into<String>, error: &ToolError, latency_ms: u64) -> Self {
        let data = match error.approval() {
            Some(required) => serde_json::to_value(required).unwrap_or_default(),
            None => serde_json::Value::Null,
        };
        Self {
            ok: false,
            error_code: Some(error.code()),
            error_message: Some(error.to_string()),
            data,
            source: source.into(),
            latency_ms,
        }
    }

    pub fn from_outcome(
        source: impl Into<String>,
        outcome: &Result<serde_json::Value, ToolError>,
        latency_ms: u64,
    ) -> Self {
        match outcome {
            Ok(data) => Self::success(source, data.clone(), latency_ms),
            Err(e) => Self::failure(source, e, latency_ms),
        }
    }

    pub fn is_success(&self) -> bool {
        self.ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_snake_case() {
        assert_eq!(ToolError::missing("host_id").code().as_str(), "missing_param");
        assert_eq!(
            ToolError::PolicyDenied("x".into()).code().as_str(),
            "policy_denied"
        );
        assert_eq!(ToolError::Panic("boom".into()).code().as_str(), "tool_panic");
        assert_eq!(
            serde_json::to_value(ErrorCode::ToolTimeout).unwrap(),
            "tool_timeout"
        );
    }

    #[test]
    fn test_classify_sniffs_untyped_errors() {
        assert_eq!(
            ToolError::Untyped("ssh: connection timeout".into()).classify(),
            ToolError::Timeout("ssh: connection timeout".into())
        );
        assert_eq!(
            ToolError::Untyped("context canceled".into()).classify(),
            ToolError::Canceled("context canceled".into())
        );
        assert_eq!(
            ToolError::Untyped("exit status 1".into()).classify(),
            ToolError::Failed("exit status 1".into())
        );
    }

    #[test]
    fn test_classify_keeps_typed_errors() {
        // A typed error mentioning "timeout" is not reclassified
        let err = ToolError::InvalidParam("timeout must be positive".into());
        assert_eq!(err.clone().classify(), err);
    }

    #[test]
    fn test_failure_result_carries_ticket() {
        let err = ToolError::ApprovalRequired(ApprovalRequired {
            ticket_id: "t-1".into(),
            tool: "host_exec".into(),
            expires_at: 42,
        });
        let result = ToolResult::failure("host_exec", &err, 3);
        assert!(!result.ok);
        assert_eq!(result.error_code, Some(ErrorCode::ApprovalRequired));
        assert_eq!(result.data["ticket_id"], "t-1");
        assert!(result.error_message.unwrap().contains("t-1"));
    }

    #[test]
    fn test_success_result() {
        let result = ToolResult::success("host_logs", serde_json::json!({"lines": 3}), 12);
        assert!(result.is_success());
        assert!(result.error_code.is_none());
        assert_eq!(result.latency_ms, 12);
    }
}
