//! `service_status`: one service with its latest release and firing alerts.

use async_trait::async_trait;
use opsplane_application::ports::ops_store::{AlertQuery, OpsStore};
use opsplane_application::ports::tool_registry::Tool;
use opsplane_domain::{RiskLevel, ToolError, ToolMeta, ToolMode, deserialize_text};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const SERVICE_STATUS: &str = "service_status";

const RELEASE_WINDOW: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatusInput {
    #[serde(deserialize_with = "deserialize_text")]
    pub service_id: String,
}

pub struct ServiceStatusTool {
    ops: Arc<dyn OpsStore>,
}

impl ServiceStatusTool {
    pub fn new(ops: Arc<dyn OpsStore>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for ServiceStatusTool {
    type Input = ServiceStatusInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            SERVICE_STATUS,
            "Show a service with its latest release and firing alerts",
            ToolMode::Readonly,
            RiskLevel::Low,
            "service:read",
        )
        .with_field("service_id", "string", "Service", true)
    }

    async fn call(&self, input: ServiceStatusInput, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let service = self.ops.get_service(&input.service_id).await?;
        let latest_release = self
            .ops
            .recent_releases(RELEASE_WINDOW)
            .await?
            .into_iter()
            .find(|r| r.service_id == service.id);
        let alerts = self
            .ops
            .search_alerts(&AlertQuery {
                service_id: Some(service.id.clone()),
                firing_only: true,
                limit: RELEASE_WINDOW,
                ..AlertQuery::default()
            })
            .await?;

        Ok(json!({
            "service": service,
            "latest_release": latest_release,
            "firing_alerts": alerts.len(),
            "alerts": alerts,
        }))
    }
}
