//! Remote command execution port.
//!
//! `run(target, command)` executes a shell command on a host identity. The
//! distinguished local targets ([`LOCAL_TARGETS`]) run in-process; anything
//! else goes over the adapter's remote channel.

use async_trait::async_trait;
use opsplane_domain::ToolError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Targets that execute on this machine instead of over a remote channel.
pub const LOCAL_TARGETS: [&str; 3] = ["localhost", "local", "127.0.0.1"];

pub fn is_local_target(target: &str) -> bool {
    LOCAL_TARGETS.contains(&target.trim())
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteExecError {
    #[error("no remote channel configured for target '{0}'")]
    Unreachable(String),

    #[error("command exited with status {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("command canceled")]
    Canceled,

    #[error("{0}")]
    Io(String),
}

impl From<RemoteExecError> for ToolError {
    fn from(err: RemoteExecError) -> Self {
        match err {
            RemoteExecError::Canceled => ToolError::Canceled("remote command canceled".into()),
            other => ToolError::Failed(other.to_string()),
        }
    }
}

#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` on `target`, returning combined stdout.
    ///
    /// Implementations abort the child when `cancel` fires.
    async fn run(
        &self,
        target: &str,
        command: &str,
        cancel: CancellationToken,
    ) -> Result<String, RemoteExecError>;
}
