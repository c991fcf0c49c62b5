//! Release tools: trigger, approve and roll back deployments.

use async_trait::async_trait;
use opsplane_application::ports::clock::Clock;
use opsplane_application::ports::ops_store::{OpsStore, ReleaseRequest};
use opsplane_application::ports::tool_registry::Tool;
use opsplane_domain::{
    RiskLevel, ToolError, ToolMeta, ToolMode, deserialize_opt_text, deserialize_text,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const RELEASE_TRIGGER: &str = "release_trigger";
pub const RELEASE_APPROVE: &str = "release_approve";
pub const RELEASE_ROLLBACK: &str = "release_rollback";

const DEFAULT_APPROVER: &str = "operator";

fn to_value<T: Serialize>(record: &T) -> Result<Value, ToolError> {
    serde_json::to_value(record).map_err(|e| ToolError::Failed(e.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseTriggerInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub deployment_id: String,
    pub env: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub version: String,
    pub runtime_type: String,
}

pub struct ReleaseTriggerTool {
    ops: Arc<dyn OpsStore>,
    clock: Arc<dyn Clock>,
}

impl ReleaseTriggerTool {
    pub fn new(ops: Arc<dyn OpsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { ops, clock }
    }
}

#[async_trait]
impl Tool for ReleaseTriggerTool {
    type Input = ReleaseTriggerInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            RELEASE_TRIGGER,
            "Trigger a release of a service version",
            ToolMode::Mutating,
            RiskLevel::High,
            "deployment:write",
        )
        .with_field("service_id", "string", "Service", true)
        .with_field("deployment_id", "string", "New deployment id", true)
        .with_field("env", "string", "Target environment", true)
        .with_field("version", "string", "Version to release", true)
        .with_field("runtime_type", "string", "Runtime (k8s, vm, ...)", true)
    }

    async fn call(&self, input: ReleaseTriggerInput, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let request = ReleaseRequest {
            service_id: input.service_id,
            deployment_id: input.deployment_id,
            env: input.env,
            version: input.version,
            runtime_type: input.runtime_type,
        };
        let record = self.ops.trigger_release(request, self.clock.now_ms()).await?;
        to_value(&record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseApproveInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub deployment_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub approver: Option<String>,
}

pub struct ReleaseApproveTool {
    ops: Arc<dyn OpsStore>,
    clock: Arc<dyn Clock>,
}

impl ReleaseApproveTool {
    pub fn new(ops: Arc<dyn OpsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { ops, clock }
    }
}

#[async_trait]
impl Tool for ReleaseApproveTool {
    type Input = ReleaseApproveInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            RELEASE_APPROVE,
            "Approve a pending release",
            ToolMode::Mutating,
            RiskLevel::Medium,
            "deployment:approve",
        )
        .with_field("deployment_id", "string", "Pending deployment", true)
        .with_field("approver", "string", "Recorded approver", false)
    }

    async fn call(&self, input: ReleaseApproveInput, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let approver = input.approver.as_deref().unwrap_or(DEFAULT_APPROVER);
        let record = self
            .ops
            .approve_release(&input.deployment_id, approver, self.clock.now_ms())
            .await?;
        to_value(&record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRollbackInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub deployment_id: String,
    pub env: String,
}

pub struct ReleaseRollbackTool {
    ops: Arc<dyn OpsStore>,
    clock: Arc<dyn Clock>,
}

impl ReleaseRollbackTool {
    pub fn new(ops: Arc<dyn OpsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { ops, clock }
    }
}

#[async_trait]
impl Tool for ReleaseRollbackTool {
    type Input = ReleaseRollbackInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            RELEASE_ROLLBACK,
            "Roll a service back from a deployment",
            ToolMode::Mutating,
            RiskLevel::High,
            "deployment:write",
        )
        .with_field("service_id", "string", "Service", true)
        .with_field("deployment_id", "string", "Deployment to roll back", true)
        .with_field("env", "string", "Environment", true)
    }

    async fn call(&self, input: ReleaseRollbackInput, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let record = self
            .ops
            .rollback_release(
                &input.service_id,
                &input.deployment_id,
                &input.env,
                self.clock.now_ms(),
            )
            .await?;
        to_value(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryOpsStore, OpsSeed};
    use opsplane_application::ports::clock::ManualClock;
    use opsplane_domain::ErrorCode;

    fn deps() -> (Arc<dyn OpsStore>, Arc<dyn Clock>) {
        (
            Arc::new(InMemoryOpsStore::from_seed(OpsSeed::sample())),
            Arc::new(ManualClock::new(42)),
        )
    }

    #[tokio::test]
    async fn test_trigger_then_approve() {
        let (ops, clock) = deps();
        let trigger = ReleaseTriggerTool::new(ops.clone(), clock.clone());
        let out = trigger
            .call(
                ReleaseTriggerInput {
                    service_id: "svc-billing".into(),
                    deployment_id: "dep-7".into(),
                    env: "staging".into(),
                    version: "0.9.1".into(),
                    runtime_type: "vm".into(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out["status"], "pending");
        assert_eq!(out["updated_at"], 42);

        let approve = ReleaseApproveTool::new(ops, clock);
        let out = approve
            .call(
                ReleaseApproveInput {
                    deployment_id: "dep-7".into(),
                    approver: None,
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out["status"], "approved");
        assert_eq!(out["approved_by"], DEFAULT_APPROVER);
    }

    #[tokio::test]
    async fn test_rollback_of_unknown_deployment_is_invalid_param() {
        let (ops, clock) = deps();
        let tool = ReleaseRollbackTool::new(ops, clock);
        let err = tool
            .call(
                ReleaseRollbackInput {
                    service_id: "svc-checkout".into(),
                    deployment_id: "dep-404".into(),
                    env: "prod".into(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_numeric_ids_decode_as_text() {
        let input: ReleaseRollbackInput = serde_json::from_value(serde_json::json!({
            "service_id": 1, "deployment_id": 77, "env": "prod"
        }))
        .unwrap();
        assert_eq!(input.service_id, "1");
        assert_eq!(input.deployment_id, "77");
    }
}
