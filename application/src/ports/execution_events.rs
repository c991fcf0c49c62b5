//! Port for execution event emission.
//!
//! The engine narrates every invocation through an [`ExecutionEventSink`]
//! carried on the request context. Sinks decide the transport (JSONL file,
//! chat stream, in-memory buffer); only the semantics of each kind are fixed
//! here. Emission is synchronous and non-fallible.

use opsplane_domain::{ParamMap, ResolutionTrace, ToolResult};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// One narrated step of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Emitted after resolution, before the policy gate.
    ToolCall {
        trace_id: String,
        tool: String,
        params: ParamMap,
        resolution: ResolutionTrace,
        attempt: u32,
    },
    /// `retry` marks the intermediate event of a missing-param retry.
    /// Exactly one event per invocation has `terminal` set.
    ToolResult {
        trace_id: String,
        tool: String,
        result: ToolResult,
        attempt: u32,
        retry: bool,
        terminal: bool,
    },
    /// Conversational path only: the call is parked behind a ticket.
    ApprovalRequired {
        trace_id: String,
        tool: String,
        ticket_id: String,
        expires_at: u64,
    },
}

impl ExecutionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::ToolCall { .. } => "tool_call",
            ExecutionEvent::ToolResult { .. } => "tool_result",
            ExecutionEvent::ApprovalRequired { .. } => "approval_required",
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            ExecutionEvent::ToolCall { tool, .. }
            | ExecutionEvent::ToolResult { tool, .. }
            | ExecutionEvent::ApprovalRequired { tool, .. } => tool,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionEvent::ToolResult { terminal: true, .. })
    }
}

pub trait ExecutionEventSink: Send + Sync {
    fn emit(&self, event: ExecutionEvent);
}

/// No-op sink for tests and when event logging is disabled.
pub struct NoExecutionEvents;

impl ExecutionEventSink for NoExecutionEvents {
    fn emit(&self, _event: ExecutionEvent) {}
}

/// Buffers events in memory. Used by the console to echo a call's narrative.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<ExecutionEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl ExecutionEventSink for RecordingEventSink {
    fn emit(&self, event: ExecutionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Forwards every event to each inner sink in order.
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn ExecutionEventSink>>,
}

impl FanoutEventSink {
    pub fn new(sinks: Vec<Arc<dyn ExecutionEventSink>>) -> Self {
        Self { sinks }
    }
}

impl ExecutionEventSink for FanoutEventSink {
    fn emit(&self, event: ExecutionEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
