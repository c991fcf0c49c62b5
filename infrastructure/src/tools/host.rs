//! Host tools: `host_exec` and `host_logs`.

use async_trait::async_trait;
use opsplane_application::ports::remote_executor::RemoteExecutor;
use opsplane_application::ports::tool_registry::Tool;
use opsplane_domain::{RiskLevel, ToolError, ToolMeta, ToolMode, deserialize_text};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const HOST_EXEC: &str = "host_exec";
pub const HOST_LOGS: &str = "host_logs";

const DEFAULT_LOG_PATH: &str = "/var/log/syslog";
const MAX_LOG_LINES: u32 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostExecInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub target: String,
    pub command: String,
}

/// Run an arbitrary shell command on a host.
pub struct HostExecTool {
    runner: Arc<dyn RemoteExecutor>,
}

impl HostExecTool {
    pub fn new(runner: Arc<dyn RemoteExecutor>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Tool for HostExecTool {
    type Input = HostExecInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            HOST_EXEC,
            "Execute a shell command on a host",
            ToolMode::Mutating,
            RiskLevel::High,
            "host:exec",
        )
        .with_field("target", "string", "Host name or address; localhost runs in-process", true)
        .with_field("command", "string", "Shell command to run", true)
    }

    async fn call(&self, input: HostExecInput, cancel: CancellationToken) -> Result<Value, ToolError> {
        if input.command.trim().is_empty() {
            return Err(ToolError::missing("command"));
        }
        let output = self.runner.run(&input.target, &input.command, cancel).await?;
        Ok(json!({ "target": input.target, "output": output }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostLogsInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub target: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_lines")]
    pub lines: u32,
}

fn default_lines() -> u32 {
    200
}

/// Tail a log file on a host.
pub struct HostLogsTool {
    runner: Arc<dyn RemoteExecutor>,
}

impl HostLogsTool {
    pub fn new(runner: Arc<dyn RemoteExecutor>) -> Self {
        Self { runner }
    }
}

/// Single-quote `path` for `sh`; paths containing quotes are refused.
fn quoted_path(path: &str) -> Result<String, ToolError> {
    if path.contains('\'') || path.contains('\0') {
        return Err(ToolError::InvalidParam(format!(
            "path contains a quote: {}",
            path
        )));
    }
    Ok(format!("'{}'", path))
}

#[async_trait]
impl Tool for HostLogsTool {
    type Input = HostLogsInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            HOST_LOGS,
            "Read the tail of a log file on a host",
            ToolMode::Readonly,
            RiskLevel::Low,
            "host:read",
        )
        .with_field("target", "string", "Host name or address", true)
        .with_field("path", "string", "Log file path", false)
        .with_field("lines", "integer", "Number of trailing lines", false)
        .with_default_hint("path", DEFAULT_LOG_PATH)
    }

    async fn call(&self, input: HostLogsInput, cancel: CancellationToken) -> Result<Value, ToolError> {
        let path = input
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_LOG_PATH);
        let lines = input.lines.clamp(1, MAX_LOG_LINES);
        let command = format!("tail -n {} {}", lines, quoted_path(path)?);

        let output = self.runner.run(&input.target, &command, cancel).await?;
        Ok(json!({
            "target": input.target,
            "path": path,
            "lines": output.lines().count(),
            "content": output,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::HostCommandRunner;
    use opsplane_domain::ErrorCode;

    #[test]
    fn test_quoted_path() {
        assert_eq!(quoted_path("/var/log/app.log").unwrap(), "'/var/log/app.log'");
        assert!(quoted_path("/tmp/x'; rm -rf /").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_host_logs_tails_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

        let tool = HostLogsTool::new(Arc::new(HostCommandRunner::new()));
        let out = tool
            .call(
                HostLogsInput {
                    target: "localhost".into(),
                    path: Some(path.display().to_string()),
                    lines: 2,
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out["content"], "two\nthree\n");
        assert_eq!(out["lines"], 2);
    }

    #[tokio::test]
    async fn test_host_exec_unreachable_target_is_tool_error() {
        let tool = HostExecTool::new(Arc::new(HostCommandRunner::new()));
        let err = tool
            .call(
                HostExecInput {
                    target: "db-1.staging".into(),
                    command: "uptime".into(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ToolError);
    }

    #[tokio::test]
    async fn test_host_exec_blank_command_is_missing() {
        let tool = HostExecTool::new(Arc::new(HostCommandRunner::new()));
        let err = tool
            .call(
                HostExecInput {
                    target: "localhost".into(),
                    command: "  ".into(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("command"));
    }
}
