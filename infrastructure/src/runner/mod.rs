//! Host command runner: local targets in-process, others over a remote channel.

use async_trait::async_trait;
use opsplane_application::ports::remote_executor::{
    RemoteExecError, RemoteExecutor, is_local_target,
};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Maximum output size (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Cut `s` to at most [`MAX_OUTPUT_SIZE`] bytes on a char boundary.
fn clip_output(s: &str) -> &str {
    let mut end = s.len().min(MAX_OUTPUT_SIZE);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// [`RemoteExecutor`] that runs `localhost`/`local` targets through `sh -c`.
///
/// Any other target goes to the configured remote channel, or fails as
/// unreachable when there is none.
#[derive(Default)]
pub struct HostCommandRunner {
    remote: Option<Arc<dyn RemoteExecutor>>,
}

impl HostCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteExecutor>) -> Self {
        self.remote = Some(remote);
        self
    }

    async fn run_local(
        &self,
        command: &str,
        cancel: CancellationToken,
    ) -> Result<String, RemoteExecError> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| RemoteExecError::Io(format!("failed to spawn command: {}", e)))?;

        // Dropping the wait future kills the child.
        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(RemoteExecError::Canceled),
            output = child.wait_with_output() => {
                output.map_err(|e| RemoteExecError::Io(e.to_string()))?
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteExecError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: clip_output(stderr.trim()).to_string(),
            });
        }

        let mut text = clip_output(&stdout).to_string();
        if text.len() < stdout.len() {
            text.push_str("\n... (output truncated)");
        }
        Ok(text)
    }
}

#[async_trait]
impl RemoteExecutor for HostCommandRunner {
    async fn run(
        &self,
        target: &str,
        command: &str,
        cancel: CancellationToken,
    ) -> Result<String, RemoteExecError> {
        if is_local_target(target) {
            debug!(target = %target, "Running command locally");
            return self.run_local(command, cancel).await;
        }
        match &self.remote {
            Some(remote) => remote.run(target, command, cancel).await,
            None => Err(RemoteExecError::Unreachable(target.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_clip_output_keeps_char_boundary() {
        assert_eq!(clip_output("uptime"), "uptime");
        let long = "é".repeat(MAX_OUTPUT_SIZE);
        let clipped = clip_output(&long);
        assert!(clipped.len() <= MAX_OUTPUT_SIZE);
        assert!(clipped.chars().all(|c| c == 'é'));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_command_output() {
        let runner = HostCommandRunner::new();
        let out = runner
            .run("localhost", "echo hello", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let runner = HostCommandRunner::new();
        let err = runner
            .run("local", "echo boom >&2; exit 3", CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteExecError::CommandFailed {
                code: 3,
                stderr: "boom".into()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_stops_waiting() {
        let runner = HostCommandRunner::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = runner.run("localhost", "sleep 10", cancel).await.unwrap_err();
        assert_eq!(err, RemoteExecError::Canceled);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_remote_target_without_channel() {
        let runner = HostCommandRunner::new();
        let err = runner
            .run("web-1.prod", "uptime", CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, RemoteExecError::Unreachable("web-1.prod".into()));
    }

    struct RecordingRemote;

    #[async_trait]
    impl RemoteExecutor for RecordingRemote {
        async fn run(
            &self,
            target: &str,
            command: &str,
            _cancel: CancellationToken,
        ) -> Result<String, RemoteExecError> {
            Ok(format!("{}: {}", target, command))
        }
    }

    #[tokio::test]
    async fn test_remote_target_delegates() {
        let runner = HostCommandRunner::new().with_remote(Arc::new(RecordingRemote));
        let out = runner
            .run("web-1.prod", "uptime", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, "web-1.prod: uptime");
    }
}
