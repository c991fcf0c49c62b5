//! Execution Engine: runs one logical tool invocation.
//!
//! # Flow
//!
//! ```text
//! params ──resolve──▶ resolved ──decode──▶ typed input
//!                                   │ fail: invalid_param (terminal)
//!                                   ▼
//!                             emit tool_call
//!                                   │
//!                              PolicyGate ── deny: policy_denied / approval_required (terminal)
//!                                   │
//!                                Attempt ── spawn body, race deadline
//!                                   │
//!                    missing_param? ├── no ──▶ terminal tool_result
//!                                   │ yes
//!                 emit tool_result(retry=true)
//!                 re-resolve with the missing field
//!                      changed? ── no ──▶ terminal tool_result (same outcome)
//!                         │ yes
//!                 decode, gate, Attempt once more ──▶ terminal tool_result
//! ```
//!
//! Exactly one terminal `tool_result` event is emitted per invocation. On
//! success the final parameters are written to the conversation's memory.

use crate::config::EngineParams;
use crate::context::ExecutionContext;
use crate::ports::execution_events::ExecutionEvent;
use crate::ports::tool_registry::{ErasedTool, ToolFuture, ToolRegistry, to_params};
use crate::use_cases::policy_gate::PolicyGate;
use futures::FutureExt;
use opsplane_domain::{
    ApprovalRequired, ParamMap, ParameterResolver, ResolutionTrace, ToolError, ToolMeta,
    ToolResult,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Final outcome of one logical invocation.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub result: ToolResult,
    /// Parameters the last attempt ran with (or would have).
    pub params: ParamMap,
    pub trace: ResolutionTrace,
    pub attempts: u32,
    pub error: Option<ToolError>,
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        self.result.ok
    }

    pub fn approval_required(&self) -> Option<&ApprovalRequired> {
        self.error.as_ref().and_then(ToolError::approval)
    }
}

pub struct ExecutionEngine {
    registry: Arc<ToolRegistry>,
    gate: Arc<PolicyGate>,
    resolver: ParameterResolver,
    params: EngineParams,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<ToolRegistry>, gate: Arc<PolicyGate>, params: EngineParams) -> Self {
        Self {
            registry,
            gate,
            resolver: ParameterResolver,
            params,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<PolicyGate> {
        &self.gate
    }

    /// Run a tool from a typed input.
    pub async fn run_typed<I: Serialize>(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        input: &I,
    ) -> ToolOutcome {
        match to_params(input) {
            Ok(params) => self.run(ctx, tool, params).await,
            Err(e) => {
                let trace = untouched_trace(&ParamMap::new());
                self.finish(ctx, tool, trace, 0, Err(e), Instant::now())
            }
        }
    }

    /// Run a tool by name.
    pub async fn run(&self, ctx: &ExecutionContext, tool: &str, params: ParamMap) -> ToolOutcome {
        let started = Instant::now();
        let Some(handle) = self.registry.get(tool) else {
            let trace = untouched_trace(&params);
            let err = ToolError::InvalidParam(format!("unknown tool: {}", tool));
            return self.finish(ctx, tool, trace, 0, Err(err), started);
        };
        let meta = handle.meta().clone();
        let sources = ctx.resolution_sources(&meta.name);

        let trace = self.resolver.resolve(&sources, &meta, &params, None);
        debug!(tool = %meta.name, filled = ?trace.sources, "Parameters resolved");

        let first = self.attempt(ctx, handle.as_ref(), &meta, &trace, 1).await;
        let Some(field) = first
            .as_ref()
            .err()
            .and_then(ToolError::missing_field)
            .map(str::to_string)
        else {
            return self.finish(ctx, &meta.name, trace, 1, first, started);
        };

        ctx.emit(ExecutionEvent::ToolResult {
            trace_id: ctx.trace_id.clone(),
            tool: meta.name.clone(),
            result: ToolResult::from_outcome(&meta.name, &first, elapsed_ms(started)),
            attempt: 1,
            retry: true,
            terminal: false,
        });

        let retrace = self
            .resolver
            .resolve(&sources, &meta, &trace.resolved, Some(&field));
        if retrace.resolved == trace.resolved {
            debug!(tool = %meta.name, field = %field, "Re-resolution changed nothing, not retrying");
            return self.finish(ctx, &meta.name, trace, 1, first, started);
        }

        info!(tool = %meta.name, field = %field, "Retrying with re-resolved parameters");
        let second = self.attempt(ctx, handle.as_ref(), &meta, &retrace, 2).await;
        self.finish(ctx, &meta.name, retrace, 2, second, started)
    }

    /// Decode, announce, gate and run one attempt.
    async fn attempt(
        &self,
        ctx: &ExecutionContext,
        tool: &dyn ErasedTool,
        meta: &ToolMeta,
        trace: &ResolutionTrace,
        attempt: u32,
    ) -> Result<Value, ToolError> {
        let cancel = CancellationToken::new();
        let body = tool.bind(&trace.resolved, cancel.clone())?;

        ctx.emit(ExecutionEvent::ToolCall {
            trace_id: ctx.trace_id.clone(),
            tool: meta.name.clone(),
            params: trace.resolved.clone(),
            resolution: trace.clone(),
            attempt,
        });

        self.gate.check(ctx, meta, &trace.resolved)?;
        self.run_bounded(meta, body, cancel).await
    }

    /// Run the body on its own task and race it against the mode deadline.
    ///
    /// The result slot is a oneshot, so a worker finishing after the deadline
    /// completes its send without blocking and the value is dropped.
    async fn run_bounded(
        &self,
        meta: &ToolMeta,
        body: ToolFuture,
        cancel: CancellationToken,
    ) -> Result<Value, ToolError> {
        let deadline = self.params.deadline_for(meta.mode);
        let (slot, result) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(body)
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ToolError::Panic(panic_message(panic.as_ref()))));
            let _ = slot.send(outcome);
        });

        match tokio::time::timeout(deadline, result).await {
            Ok(Ok(outcome)) => outcome.map_err(ToolError::classify),
            Ok(Err(_)) => Err(ToolError::Canceled(format!(
                "{} worker exited without a result",
                meta.name
            ))),
            Err(_) => {
                cancel.cancel();
                warn!(tool = %meta.name, deadline_ms = deadline.as_millis() as u64, "Tool deadline exceeded");
                Err(ToolError::Timeout(format!(
                    "{} exceeded its {}ms deadline",
                    meta.name,
                    deadline.as_millis()
                )))
            }
        }
    }

    fn finish(
        &self,
        ctx: &ExecutionContext,
        tool: &str,
        trace: ResolutionTrace,
        attempts: u32,
        outcome: Result<Value, ToolError>,
        started: Instant,
    ) -> ToolOutcome {
        let result = ToolResult::from_outcome(tool, &outcome, elapsed_ms(started));
        ctx.emit(ExecutionEvent::ToolResult {
            trace_id: ctx.trace_id.clone(),
            tool: tool.to_string(),
            result: result.clone(),
            attempt: attempts.max(1),
            retry: false,
            terminal: true,
        });

        match &outcome {
            Ok(_) => {
                ctx.remember(tool, &trace.resolved);
                info!(tool = %tool, caller = %ctx.caller_id, attempts, latency_ms = result.latency_ms, "Tool succeeded");
            }
            Err(ToolError::ApprovalRequired(required)) => {
                info!(tool = %tool, caller = %ctx.caller_id, ticket = %required.ticket_id, "Tool awaiting approval");
            }
            Err(e) => {
                warn!(tool = %tool, caller = %ctx.caller_id, attempts, code = %e.code(), error = %e, "Tool failed");
            }
        }

        ToolOutcome {
            result,
            params: trace.resolved.clone(),
            trace,
            attempts,
            error: outcome.err(),
        }
    }
}

fn untouched_trace(params: &ParamMap) -> ResolutionTrace {
    ResolutionTrace {
        input: params.clone(),
        filled: ParamMap::new(),
        sources: Default::default(),
        missing_field: None,
        resolved: params.clone(),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
