use super::{read, write};
use crate::ports::clock::Clock;
use opsplane_domain::{CommandRecord, ExecutionRecord, ParamMap, ToolMode, ToolResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Execution records and command history, one lock per table.
pub struct ExecutionRecordStore {
    executions: RwLock<HashMap<String, ExecutionRecord>>,
    commands: RwLock<HashMap<String, CommandRecord>>,
    clock: Arc<dyn Clock>,
}

impl ExecutionRecordStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            executions: RwLock::new(HashMap::new()),
            commands: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    // ==================== Executions ====================

    pub fn start_execution(
        &self,
        tool: &str,
        params: &ParamMap,
        mode: ToolMode,
        requester: &str,
    ) -> ExecutionRecord {
        let record = ExecutionRecord::start(
            uuid::Uuid::new_v4().to_string(),
            tool,
            params.clone(),
            mode,
            requester,
            self.now(),
        );
        write(&self.executions).insert(record.id.clone(), record.clone());
        debug!(execution = %record.id, tool = %tool, "Execution started");
        record
    }

    /// Record the terminal outcome. A record that already finished is left as is.
    pub fn finish_execution(
        &self,
        id: &str,
        params: ParamMap,
        result: ToolResult,
    ) -> Option<ExecutionRecord> {
        let now = self.now();
        let mut executions = write(&self.executions);
        let record = executions.get_mut(id)?;
        if record.finish(params, result, now) {
            debug!(execution = %id, status = %record.status.as_str(), "Execution finished");
        }
        Some(record.clone())
    }

    pub fn get_execution(&self, id: &str) -> Option<ExecutionRecord> {
        read(&self.executions).get(id).cloned()
    }

    // ==================== Commands ====================

    /// Insert or replace a command record, stamping `updated_at`.
    pub fn save_command(&self, mut record: CommandRecord) -> CommandRecord {
        let now = self.now();
        let mut commands = write(&self.commands);
        if let Some(existing) = commands.get(&record.command_id) {
            record.created_at = existing.created_at;
        }
        record.updated_at = now;
        commands.insert(record.command_id.clone(), record.clone());
        record
    }

    pub fn get_command(&self, id: &str) -> Option<CommandRecord> {
        read(&self.commands).get(id).cloned()
    }

    /// Most recently updated first.
    pub fn command_history(&self, limit: usize) -> Vec<CommandRecord> {
        let mut records: Vec<CommandRecord> = read(&self.commands).values().cloned().collect();
        records.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.command_id.cmp(&b.command_id))
        });
        records.truncate(limit);
        records
    }
}
