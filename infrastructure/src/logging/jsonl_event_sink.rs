//! JSONL file writer for execution events.
//!
//! Each [`ExecutionEvent`] is serialized as a single JSON line carrying its
//! `type` tag plus a `timestamp`, appended through a buffered writer.

use opsplane_application::ports::execution_events::{ExecutionEvent, ExecutionEventSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only execution event log, one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlEventSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventSink {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExecutionEventSink for JsonlEventSink {
    fn emit(&self, event: ExecutionEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = match serde_json::to_value(&event) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp),
                );
                serde_json::Value::Object(map)
            }
            Ok(other) => serde_json::json!({
                "type": event.kind(),
                "timestamp": timestamp,
                "data": other,
            }),
            Err(e) => {
                warn!(kind = event.kind(), "Could not serialize execution event: {}", e);
                return;
            }
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsplane_domain::{ErrorCode, ToolError, ToolResult};
    use std::io::Read;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();

        sink.emit(ExecutionEvent::ApprovalRequired {
            trace_id: "tr-1".into(),
            tool: "release_rollback".into(),
            ticket_id: "tk-1".into(),
            expires_at: 600_000,
        });
        sink.emit(ExecutionEvent::ToolResult {
            trace_id: "tr-1".into(),
            tool: "host_logs".into(),
            result: ToolResult::failure("host_logs", &ToolError::Timeout("8000ms".into()), 8_000),
            attempt: 1,
            retry: false,
            terminal: true,
        });
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
            assert_eq!(line["trace_id"], "tr-1");
        }
        assert_eq!(lines[0]["type"], "approval_required");
        assert_eq!(lines[0]["ticket_id"], "tk-1");
        assert_eq!(lines[1]["type"], "tool_result");
        assert_eq!(
            lines[1]["result"]["error_code"],
            serde_json::to_value(ErrorCode::ToolTimeout).unwrap()
        );
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let event = || ExecutionEvent::ApprovalRequired {
            trace_id: "tr".into(),
            tool: "t".into(),
            ticket_id: "tk".into(),
            expires_at: 1,
        };

        JsonlEventSink::new(&path).unwrap().emit(event());
        JsonlEventSink::new(&path).unwrap().emit(event());

        assert_eq!(read_lines(&path).len(), 2);
    }
}
