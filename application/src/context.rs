//! Per-request execution context.
//!
//! Everything request-scoped the engine and gate need travels in one
//! [`ExecutionContext`] value: who is calling, the approval token they
//! presented, conversation hints, the conversation's memory, the event sink
//! and the permission checker.

use crate::ports::execution_events::{ExecutionEvent, ExecutionEventSink, NoExecutionEvents};
use crate::ports::permission::PermissionChecker;
use crate::ports::session_memory::SessionMemory;
use opsplane_domain::{ParamMap, ResolutionSources};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ExecutionContext {
    pub caller_id: String,
    pub trace_id: String,
    pub conversation_id: Option<String>,
    pub approval_token: Option<String>,
    pub runtime_hints: ParamMap,
    pub memory: Option<Arc<dyn SessionMemory>>,
    pub events: Arc<dyn ExecutionEventSink>,
    pub permissions: Arc<dyn PermissionChecker>,
}

impl ExecutionContext {
    pub fn new(caller_id: impl Into<String>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self {
            caller_id: caller_id.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
            conversation_id: None,
            approval_token: None,
            runtime_hints: ParamMap::new(),
            memory: None,
            events: Arc::new(NoExecutionEvents),
            permissions,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Blank tokens count as no token.
    pub fn with_approval_token(mut self, token: Option<String>) -> Self {
        self.approval_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.runtime_hints.insert(key.into(), value.into());
        self
    }

    pub fn with_hints(mut self, hints: ParamMap) -> Self {
        self.runtime_hints.extend(hints);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn SessionMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn ExecutionEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.is_admin(&self.caller_id)
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.has_permission(&self.caller_id, code)
    }

    /// Snapshot the resolver inputs for `tool`.
    pub fn resolution_sources(&self, tool: &str) -> ResolutionSources {
        let memory = self.memory.as_ref().and_then(|m| m.recall(tool));
        ResolutionSources::new(self.runtime_hints.clone(), memory)
    }

    pub fn remember(&self, tool: &str, params: &ParamMap) {
        if let Some(memory) = &self.memory {
            memory.remember(tool, params);
        }
    }

    pub fn emit(&self, event: ExecutionEvent) {
        self.events.emit(event);
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("caller_id", &self.caller_id)
            .field("trace_id", &self.trace_id)
            .field("conversation_id", &self.conversation_id)
            .field("approval_token", &self.approval_token)
            .field("runtime_hints", &self.runtime_hints)
            .field("has_memory", &self.memory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::permission::AllowAllPermissions;
    use crate::ports::session_memory::InMemorySessionMemory;
    use serde_json::json;

    #[test]
    fn test_blank_token_is_none() {
        let ctx = ExecutionContext::new("alice", Arc::new(AllowAllPermissions))
            .with_approval_token(Some("   ".into()));
        assert!(ctx.approval_token.is_none());
    }

    #[test]
    fn test_resolution_sources_include_memory() {
        let memory = Arc::new(InMemorySessionMemory::new());
        memory.remember("host_logs", json!({"target": "web-1"}).as_object().unwrap());

        let ctx = ExecutionContext::new("alice", Arc::new(AllowAllPermissions))
            .with_hint("env", "prod")
            .with_memory(memory);

        let sources = ctx.resolution_sources("host_logs");
        assert_eq!(sources.runtime_hints["env"], "prod");
        assert_eq!(sources.memory.unwrap()["target"], "web-1");
        assert!(ctx.resolution_sources("cluster_pods").memory.is_none());
    }
}
