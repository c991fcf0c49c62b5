//! Command Bridge: intent-routed façade over the execution engine.
//!
//! A command is free text plus optional structured parameters. The bridge
//! routes it to a [`CommandAction`](opsplane_domain::CommandAction), builds a
//! fingerprinted plan, and drives the preview → approve → execute round trip:
//!
//! ```text
//! preview(text) ──▶ CommandContext ──▶ record (blocked | previewed)
//!                        │ high risk and complete
//!                        └──▶ pending approval ticket
//!
//! execute(confirm=true, command_id | text)
//!   ├─ permission, required fields      ──fail──▶ rejected
//!   ├─ high risk: approved ticket token ──fail──▶ rejected ("approval token required")
//!   ├─ custom executor (aggregate / alert / inventory search)
//!   │    or ExecutionEngine::run(action.tool)
//!   └─ record (succeeded | failed) with result and summary
//! ```
//!
//! Approval required is a hard failure here; only the conversational path
//! treats it as an inline event.

pub mod aggregate;
pub mod search;

pub use aggregate::{AggregateDomain, AggregateFailure, AggregateReport, Aggregator};

use crate::config::AggregateParams;
use crate::context::ExecutionContext;
use crate::ports::ops_store::OpsStore;
use crate::stores::{ApprovalTicketStore, ExecutionRecordStore};
use crate::use_cases::execution_engine::ExecutionEngine;
use opsplane_domain::command::plan::missing_fields;
use opsplane_domain::command::{
    classify_risk, command_actions, extract_params, find_action, matching_intents,
};
use opsplane_domain::{
    ApprovalRequired, CommandAction, CommandContext, CommandError, CommandPlan, CommandRecord,
    CommandRisk, CommandStatus, CustomExecutor, ParamMap, TicketStatus, ToolError, ToolMeta,
    ToolResult,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Input to preview and execute.
#[derive(Debug, Clone, Default)]
pub struct CommandRequest {
    pub text: String,
    /// Explicit intent; detected from `text` when absent.
    pub intent: Option<String>,
    /// Structured parameters; they override `k=v` tokens in `text`.
    pub params: ParamMap,
    /// Execute a previously previewed command.
    pub command_id: Option<String>,
    pub confirm: bool,
    pub approval_token: Option<String>,
}

impl CommandRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn for_command(command_id: impl Into<String>) -> Self {
        Self {
            command_id: Some(command_id.into()),
            ..Self::default()
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_params(mut self, params: ParamMap) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.approval_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandPreview {
    pub record: CommandRecord,
    pub plan: CommandPlan,
    pub prompts: BTreeMap<String, String>,
    pub next_intents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRequired>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSuggestion {
    pub intent: &'static str,
    pub domain: &'static str,
    pub description: &'static str,
    pub risk: CommandRisk,
    /// Required fields the text does not supply yet.
    pub missing: Vec<String>,
    pub next_intents: &'static [&'static str],
}

impl CommandSuggestion {
    fn new(action: &'static CommandAction, params: &ParamMap) -> Self {
        Self {
            intent: action.intent,
            domain: action.domain,
            description: action.description,
            risk: classify_risk(action.mode, action.risk),
            missing: missing_fields(action, params),
            next_intents: action.next_intents,
        }
    }
}

struct Dispatched {
    result: ToolResult,
    error: Option<ToolError>,
    summary: String,
}

pub struct CommandBridge {
    engine: Arc<ExecutionEngine>,
    records: Arc<ExecutionRecordStore>,
    ops: Arc<dyn OpsStore>,
    aggregator: Aggregator,
}

impl CommandBridge {
    pub fn new(
        engine: Arc<ExecutionEngine>,
        records: Arc<ExecutionRecordStore>,
        ops: Arc<dyn OpsStore>,
        aggregate: AggregateParams,
    ) -> Self {
        Self {
            engine,
            records,
            aggregator: Aggregator::new(Arc::clone(&ops), aggregate),
            ops,
        }
    }

    fn tickets(&self) -> &Arc<ApprovalTicketStore> {
        self.engine.gate().tickets()
    }

    /// Candidate intents for `text` in priority order; every intent when nothing matches.
    pub fn suggestions(&self, text: &str) -> Vec<CommandSuggestion> {
        let params = extract_params(text);
        let matched = matching_intents(text);
        let actions: Vec<&'static CommandAction> = if matched.is_empty() {
            command_actions().iter().collect()
        } else {
            matched.into_iter().filter_map(find_action).collect()
        };
        actions
            .into_iter()
            .map(|action| CommandSuggestion::new(action, &params))
            .collect()
    }

    pub fn preview(
        &self,
        ctx: &ExecutionContext,
        request: &CommandRequest,
    ) -> Result<CommandPreview, CommandError> {
        let command = CommandContext::build(
            uuid::Uuid::new_v4().to_string(),
            ctx.trace_id.clone(),
            &request.text,
            request.intent.as_deref(),
            &request.params,
        )?;
        self.check_permission(ctx, &command)?;

        let status = if command.is_blocked() {
            CommandStatus::Blocked
        } else {
            CommandStatus::Previewed
        };
        let mut record =
            CommandRecord::from_context(&command, status, &ctx.caller_id, self.records.now());

        let approval = if !command.is_blocked() && command.risk().needs_approval() {
            let ticket = self.tickets().create(
                &self.action_meta(&command.action),
                &command.params,
                &ctx.caller_id,
            );
            record.approval_ticket = Some(ticket.id.clone());
            Some(ticket.required())
        } else {
            None
        };

        let record = self.records.save_command(record);
        info!(
            command = %record.command_id,
            intent = %record.intent,
            status = %record.status,
            plan_hash = %record.plan_hash,
            "Command previewed"
        );
        Ok(CommandPreview {
            record,
            plan: command.plan.clone(),
            prompts: command.prompts.clone(),
            next_intents: command
                .action
                .next_intents
                .iter()
                .map(|s| s.to_string())
                .collect(),
            approval,
        })
    }

    /// Run a command. Refusals are persisted as `rejected` and returned as errors;
    /// a command that ran is returned as its record, succeeded or failed.
    pub async fn execute(
        &self,
        ctx: &ExecutionContext,
        request: &CommandRequest,
    ) -> Result<CommandRecord, CommandError> {
        if !request.confirm {
            return Err(CommandError::ConfirmationRequired);
        }

        let (command, prior) = self.rebuild(ctx, request)?;
        let mut record = CommandRecord::from_context(
            &command,
            CommandStatus::Running,
            &ctx.caller_id,
            self.records.now(),
        );
        record.approval_ticket = prior.and_then(|p| p.approval_ticket);

        if let Err(e) = self.check_permission(ctx, &command) {
            return Err(self.reject(record, e));
        }
        if command.is_blocked() {
            let missing = command.missing.clone();
            return Err(self.reject(record, CommandError::MissingFields(missing)));
        }

        let token = request
            .approval_token
            .clone()
            .or_else(|| ctx.approval_token.clone())
            .filter(|t| !t.trim().is_empty());
        if command.risk().needs_approval() {
            match token.as_deref() {
                None => {
                    let ticket_id = self.pending_ticket(ctx, &command, record.approval_ticket.as_deref());
                    record.approval_ticket = Some(ticket_id.clone());
                    return Err(self.reject(
                        record,
                        CommandError::ApprovalTokenRequired {
                            ticket_id: Some(ticket_id),
                        },
                    ));
                }
                Some(token) => {
                    if let Err(e) = self.verify_ticket(ctx, &command, token) {
                        return Err(self.reject(record, e));
                    }
                    record.approval_ticket = Some(token.to_string());
                }
            }
        }

        let record = self.records.save_command(record);
        let exec_ctx = ctx
            .clone()
            .with_trace_id(command.trace_id.clone())
            .with_approval_token(token);
        let dispatched = self.dispatch(&exec_ctx, &command).await;

        if let Some(required) = dispatched.error.as_ref().and_then(ToolError::approval) {
            let mut record = record;
            record.approval_ticket = Some(required.ticket_id.clone());
            let ticket_id = Some(required.ticket_id.clone());
            return Err(self.reject(record, CommandError::ApprovalTokenRequired { ticket_id }));
        }

        let mut record = record;
        record.status = if dispatched.result.ok {
            CommandStatus::Succeeded
        } else {
            CommandStatus::Failed
        };
        record.summary = Some(dispatched.summary);
        record.result = serde_json::to_value(&dispatched.result).ok();
        let record = self.records.save_command(record);

        info!(
            command = %record.command_id,
            intent = %record.intent,
            status = %record.status,
            "Command executed"
        );
        Ok(record)
    }

    pub fn history(&self, limit: usize) -> Vec<CommandRecord> {
        self.records.command_history(limit)
    }

    pub fn get(&self, command_id: &str) -> Result<CommandRecord, CommandError> {
        self.records
            .get_command(command_id)
            .ok_or_else(|| CommandError::NotFound(command_id.to_string()))
    }

    // ==================== Internals ====================

    fn rebuild(
        &self,
        ctx: &ExecutionContext,
        request: &CommandRequest,
    ) -> Result<(CommandContext, Option<CommandRecord>), CommandError> {
        if let Some(id) = request.command_id.as_deref().filter(|id| !id.trim().is_empty()) {
            let prior = self.get(id)?;
            let mut structured = prior.params.clone();
            structured.extend(request.params.clone());
            let command = CommandContext::build(
                prior.command_id.clone(),
                prior.trace_id.clone(),
                &prior.text,
                Some(prior.intent.as_str()),
                &structured,
            )?;
            return Ok((command, Some(prior)));
        }
        let command = CommandContext::build(
            uuid::Uuid::new_v4().to_string(),
            ctx.trace_id.clone(),
            &request.text,
            request.intent.as_deref(),
            &request.params,
        )?;
        Ok((command, None))
    }

    fn check_permission(
        &self,
        ctx: &ExecutionContext,
        command: &CommandContext,
    ) -> Result<(), CommandError> {
        let permission = command.action.permission;
        if ctx.is_admin() || ctx.has_permission(permission) {
            return Ok(());
        }
        warn!(caller = %ctx.caller_id, intent = %command.intent, permission, "Command permission denied");
        Err(CommandError::PermissionDenied(format!(
            "{} lacks permission {} for {}",
            ctx.caller_id, permission, command.intent
        )))
    }

    /// Metadata tickets for this action are scoped to: the routed tool's, or
    /// one synthesized from the action when it has a custom executor.
    fn action_meta(&self, action: &CommandAction) -> ToolMeta {
        action
            .tool
            .and_then(|tool| self.engine.registry().meta(tool).cloned())
            .unwrap_or_else(|| {
                ToolMeta::new(
                    action.tool.unwrap_or(action.intent),
                    action.description,
                    action.mode,
                    action.risk,
                    action.permission,
                )
            })
    }

    /// Reuse the command's pending ticket or mint a fresh one.
    fn pending_ticket(
        &self,
        ctx: &ExecutionContext,
        command: &CommandContext,
        existing: Option<&str>,
    ) -> String {
        if let Some(id) = existing
            && let Ok(ticket) = self.tickets().observe(id)
            && ticket.status == TicketStatus::Pending
            && ticket.requester == ctx.caller_id
        {
            return ticket.id;
        }
        self.tickets()
            .create(&self.action_meta(&command.action), &command.params, &ctx.caller_id)
            .id
    }

    fn verify_ticket(
        &self,
        ctx: &ExecutionContext,
        command: &CommandContext,
        token: &str,
    ) -> Result<(), CommandError> {
        let ticket = self.tickets().observe(token)?;
        let scope = self.action_meta(&command.action);
        ticket.authorizes(&scope.name, &ctx.caller_id, ctx.is_admin(), self.tickets().now())?;
        Ok(())
    }

    fn reject(&self, mut record: CommandRecord, error: CommandError) -> CommandError {
        warn!(command = %record.command_id, intent = %record.intent, code = error.code(), error = %error, "Command rejected");
        record.status = CommandStatus::Rejected;
        record.summary = Some(error.to_string());
        self.records.save_command(record);
        error
    }

    async fn dispatch(&self, ctx: &ExecutionContext, command: &CommandContext) -> Dispatched {
        let started = Instant::now();
        let action = &command.action;

        if let Some(executor) = action.executor {
            let outcome = self.run_custom(executor, &command.params).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            return match outcome {
                Ok((data, summary)) => Dispatched {
                    result: ToolResult::success(action.intent, data, latency_ms),
                    error: None,
                    summary,
                },
                Err(e) => Dispatched {
                    result: ToolResult::failure(action.intent, &e, latency_ms),
                    summary: format!("{} failed: {}", action.intent, e),
                    error: Some(e),
                },
            };
        }

        let Some(tool) = action.tool else {
            let error = ToolError::Failed(format!("{} declares no executor", action.intent));
            return Dispatched {
                result: ToolResult::failure(action.intent, &error, 0),
                summary: error.to_string(),
                error: Some(error),
            };
        };

        let outcome = self.engine.run(ctx, tool, command.params.clone()).await;
        let summary = match &outcome.error {
            None => format!("{} completed via {}", action.intent, tool),
            Some(e) => format!("{} failed: {}", action.intent, e),
        };
        Dispatched {
            result: outcome.result,
            error: outcome.error,
            summary,
        }
    }

    async fn run_custom(
        &self,
        executor: CustomExecutor,
        params: &ParamMap,
    ) -> Result<(Value, String), ToolError> {
        match executor {
            CustomExecutor::Aggregate => {
                let report = self.aggregator.run(params).await;
                let summary = report.summary();
                let value =
                    serde_json::to_value(&report).map_err(|e| ToolError::Failed(e.to_string()))?;
                Ok((value, summary))
            }
            CustomExecutor::AlertSearch => {
                let value = search::search_alerts(self.ops.as_ref(), params).await?;
                let summary = format!("{} alert(s) matched", value["count"]);
                Ok((value, summary))
            }
            CustomExecutor::InventorySearch => {
                let value = search::search_inventory(self.ops.as_ref(), params).await?;
                let summary = format!("{} inventory item(s) matched", value["count"]);
                Ok((value, summary))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineParams;
    use crate::ports::clock::ManualClock;
    use crate::testing::{FixtureOps, GrantTable, command_registry};
    use crate::use_cases::policy_gate::PolicyGate;
    use opsplane_domain::command::action::{
        INTENT_AGGREGATE, INTENT_ALERTS, INTENT_RELEASE, INTENT_ROLLBACK,
    };
    use opsplane_domain::{ApprovalError, ReviewDecision};
    use serde_json::json;

    struct Fixture {
        bridge: CommandBridge,
        tickets: Arc<ApprovalTicketStore>,
        grants: Arc<GrantTable>,
    }

    fn fixture_with(ops: FixtureOps) -> Fixture {
        let clock = Arc::new(ManualClock::new(1_000));
        let tickets = Arc::new(ApprovalTicketStore::new(clock.clone(), 600_000));
        let records = Arc::new(ExecutionRecordStore::new(clock));
        let engine = Arc::new(ExecutionEngine::new(
            Arc::new(command_registry()),
            Arc::new(PolicyGate::new(tickets.clone())),
            EngineParams::default(),
        ));
        Fixture {
            bridge: CommandBridge::new(engine, records, Arc::new(ops), AggregateParams::default()),
            tickets,
            grants: Arc::new(
                GrantTable::new()
                    .grant("alice", &["ops:read", "alert:read", "deployment:*", "service:read"])
                    .grant("eve", &["ops:read"]),
            ),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(FixtureOps::seeded())
    }

    fn ctx(f: &Fixture, caller: &str) -> ExecutionContext {
        ExecutionContext::new(caller, f.grants.clone()).with_trace_id("tr-cmd")
    }

    #[test]
    fn test_preview_release_is_blocked() {
        let f = fixture();
        let preview = f
            .bridge
            .preview(&ctx(&f, "alice"), &CommandRequest::text("deployment.release service_id=1"))
            .unwrap();

        assert_eq!(preview.record.status, CommandStatus::Blocked);
        assert_eq!(preview.record.intent, INTENT_RELEASE);
        assert_eq!(
            preview.record.missing,
            vec!["deployment_id", "env", "version", "runtime_type"]
        );
        assert_eq!(preview.prompts.len(), 4);
        assert!(preview.approval.is_none());
        assert!(f.tickets.is_empty());
    }

    #[test]
    fn test_preview_high_risk_mints_ticket() {
        let f = fixture();
        let request =
            CommandRequest::text("rollback service_id=svc-1 deployment_id=dep-1 env=prod");
        let preview = f.bridge.preview(&ctx(&f, "alice"), &request).unwrap();

        assert_eq!(preview.record.status, CommandStatus::Previewed);
        assert_eq!(preview.record.risk, CommandRisk::High);
        let approval = preview.approval.unwrap();
        assert_eq!(approval.tool, "release_rollback");
        assert_eq!(preview.record.approval_ticket.as_deref(), Some(approval.ticket_id.as_str()));
        assert_eq!(
            f.tickets.get(&approval.ticket_id).unwrap().status,
            TicketStatus::Pending
        );
    }

    #[test]
    fn test_preview_requires_permission() {
        let f = fixture();
        let err = f
            .bridge
            .preview(&ctx(&f, "eve"), &CommandRequest::text("rollback service_id=1"))
            .unwrap_err();
        assert!(matches!(err, CommandError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_execute_requires_confirmation() {
        let f = fixture();
        let err = f
            .bridge
            .execute(&ctx(&f, "alice"), &CommandRequest::text("overview"))
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::ConfirmationRequired);
    }

    #[tokio::test]
    async fn test_high_risk_round_trip() {
        let f = fixture();
        let alice = ctx(&f, "alice");
        let request = CommandRequest::text("rollback checkout")
            .with_params(
                json!({"service_id": "svc-1", "deployment_id": "dep-1", "env": "prod"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .confirmed();

        let err = f.bridge.execute(&alice, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "approval token required");
        let CommandError::ApprovalTokenRequired {
            ticket_id: Some(ticket_id),
        } = err
        else {
            panic!("expected a minted ticket");
        };
        let rejected = f.bridge.history(1).remove(0);
        assert_eq!(rejected.status, CommandStatus::Rejected);
        assert_eq!(rejected.intent, INTENT_ROLLBACK);

        f.tickets
            .confirm(&ticket_id, ReviewDecision::Approve, "carol")
            .unwrap();
        let record = f
            .bridge
            .execute(&alice, &request.clone().with_token(ticket_id.clone()))
            .await
            .unwrap();

        assert_eq!(record.status, CommandStatus::Succeeded);
        assert_eq!(record.approval_ticket.as_deref(), Some(ticket_id.as_str()));
        let result = record.result.unwrap();
        assert_eq!(result["data"]["tool"], "release_rollback");
        assert_eq!(result["data"]["params"]["deployment_id"], "dep-1");
    }

    #[tokio::test]
    async fn test_execute_from_preview_reuses_ticket_and_hash() {
        let f = fixture();
        let alice = ctx(&f, "alice");
        let preview = f
            .bridge
            .preview(
                &alice,
                &CommandRequest::text("rollback service_id=svc-1 deployment_id=dep-1 env=prod"),
            )
            .unwrap();
        let ticket_id = preview.approval.unwrap().ticket_id;

        let request = CommandRequest::for_command(&preview.record.command_id).confirmed();
        let err = f.bridge.execute(&alice, &request).await.unwrap_err();
        assert_eq!(
            err,
            CommandError::ApprovalTokenRequired {
                ticket_id: Some(ticket_id.clone())
            }
        );
        assert_eq!(f.tickets.len(), 1);

        f.tickets
            .confirm(&ticket_id, ReviewDecision::Approve, "carol")
            .unwrap();
        let record = f
            .bridge
            .execute(&alice, &request.with_token(ticket_id))
            .await
            .unwrap();
        assert_eq!(record.command_id, preview.record.command_id);
        assert_eq!(record.plan_hash, preview.record.plan_hash);
        assert_eq!(record.status, CommandStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_unapproved_token_is_rejected() {
        let f = fixture();
        let alice = ctx(&f, "alice");
        let request = CommandRequest::text("rollback service_id=svc-1 deployment_id=dep-1 env=prod")
            .confirmed();
        let Err(CommandError::ApprovalTokenRequired {
            ticket_id: Some(ticket_id),
        }) = f.bridge.execute(&alice, &request).await
        else {
            panic!("expected approval token required");
        };

        let err = f
            .bridge
            .execute(&alice, &request.with_token(ticket_id))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Approval(ApprovalError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_execute_with_missing_fields_is_rejected() {
        let f = fixture();
        let err = f
            .bridge
            .execute(
                &ctx(&f, "alice"),
                &CommandRequest::text("deployment.release service_id=1").confirmed(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "missing_param");
        assert!(matches!(err, CommandError::MissingFields(ref m) if m.len() == 4));
    }

    #[tokio::test]
    async fn test_low_risk_mutation_hits_engine_gate() {
        let f = fixture();
        let err = f
            .bridge
            .execute(
                &ctx(&f, "alice"),
                &CommandRequest::text("approve deployment_id=dep-1").confirmed(),
            )
            .await
            .unwrap_err();
        let CommandError::ApprovalTokenRequired {
            ticket_id: Some(ticket_id),
        } = err
        else {
            panic!("expected engine-minted ticket");
        };
        assert_eq!(f.tickets.get(&ticket_id).unwrap().tool, "release_approve");
    }

    #[tokio::test]
    async fn test_aggregate_scenario() {
        let f = fixture();
        let record = f
            .bridge
            .execute(
                &ctx(&f, "alice"),
                &CommandRequest::text("overview")
                    .with_params(
                        json!({"limit": 5, "max_parallel": 2, "timeout_sec": 3})
                            .as_object()
                            .cloned()
                            .unwrap(),
                    )
                    .confirmed(),
            )
            .await
            .unwrap();

        assert_eq!(record.intent, INTENT_AGGREGATE);
        assert_eq!(record.status, CommandStatus::Succeeded);
        let data = &record.result.as_ref().unwrap()["data"];
        for key in ["services", "releases", "alerts", "relations"] {
            assert!(data["details"][key]["count"].as_u64().unwrap() >= 1, "{key}");
        }
        assert_eq!(data["failures"], json!([]));
        assert_eq!(record.summary.as_deref(), Some("4/4 domains answered"));
    }

    #[tokio::test]
    async fn test_aggregate_partial_failure_still_succeeds() {
        let f = fixture_with(FixtureOps::seeded().failing_alerts());
        let record = f
            .bridge
            .execute(&ctx(&f, "alice"), &CommandRequest::text("summary").confirmed())
            .await
            .unwrap();

        assert_eq!(record.status, CommandStatus::Succeeded);
        let data = &record.result.unwrap()["data"];
        assert_eq!(data["failures"][0]["domain"], "alerts");
        assert!(data["details"].get("alerts").is_none());
    }

    #[tokio::test]
    async fn test_alert_search_and_readonly_tool() {
        let f = fixture();
        let alice = ctx(&f, "alice");
        let record = f
            .bridge
            .execute(&alice, &CommandRequest::text("firing alerts").confirmed())
            .await
            .unwrap();
        assert_eq!(record.intent, INTENT_ALERTS);
        assert_eq!(record.summary.as_deref(), Some("1 alert(s) matched"));

        let record = f
            .bridge
            .execute(&alice, &CommandRequest::text("status service_id=svc-1").confirmed())
            .await
            .unwrap();
        assert_eq!(record.status, CommandStatus::Succeeded);
        let result: ToolResult = serde_json::from_value(record.result.unwrap()).unwrap();
        assert_eq!(result.source, "service_status");
    }

    #[tokio::test]
    async fn test_unknown_intent_and_lookup() {
        let f = fixture();
        let alice = ctx(&f, "alice");
        let err = f
            .bridge
            .execute(&alice, &CommandRequest::text("x").with_intent("billing.refund").confirmed())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unknown_intent");

        let record = f
            .bridge
            .execute(
                &alice,
                &CommandRequest::text("health").with_param("service_id", "svc-1").confirmed(),
            )
            .await
            .unwrap();
        assert_eq!(
            f.bridge.get(&record.command_id).unwrap().status,
            CommandStatus::Succeeded
        );
        assert!(matches!(f.bridge.get("nope"), Err(CommandError::NotFound(_))));
    }

    #[test]
    fn test_suggestions() {
        let f = fixture();
        let suggestions = f.bridge.suggestions("release or rollback service_id=svc-1");
        let intents: Vec<&str> = suggestions.iter().map(|s| s.intent).collect();
        assert_eq!(intents, vec![INTENT_ROLLBACK, INTENT_RELEASE]);
        assert_eq!(suggestions[0].missing, vec!["deployment_id", "env"]);

        assert_eq!(f.bridge.suggestions("hello").len(), command_actions().len());
    }
}
