//! `cluster_pods`: list pods in a namespace.

use async_trait::async_trait;
use opsplane_application::ports::cluster::{ClusterClientResolver, ClusterError};
use opsplane_application::ports::tool_registry::Tool;
use opsplane_domain::{RiskLevel, ToolError, ToolMeta, ToolMode, deserialize_opt_text};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const CLUSTER_PODS: &str = "cluster_pods";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterPodsInput {
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub cluster_id: Option<String>,
    pub namespace: String,
}

pub struct ClusterPodsTool {
    clusters: Arc<dyn ClusterClientResolver>,
}

impl ClusterPodsTool {
    pub fn new(clusters: Arc<dyn ClusterClientResolver>) -> Self {
        Self { clusters }
    }
}

#[async_trait]
impl Tool for ClusterPodsTool {
    type Input = ClusterPodsInput;

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(
            CLUSTER_PODS,
            "List pods in a cluster namespace",
            ToolMode::Readonly,
            RiskLevel::Low,
            "cluster:read",
        )
        .with_field("cluster_id", "string", "Cluster; the default cluster when omitted", false)
        .with_field("namespace", "string", "Namespace", true)
    }

    async fn call(&self, input: ClusterPodsInput, cancel: CancellationToken) -> Result<Value, ToolError> {
        let client = match self.clusters.resolve(input.cluster_id.as_deref()) {
            Ok(client) => client,
            // No default to fall back on: the caller has to name the cluster.
            Err(ClusterError::UnknownCluster(_)) if input.cluster_id.is_none() => {
                return Err(ToolError::missing("cluster_id"));
            }
            Err(e) => return Err(e.into()),
        };

        let pods = tokio::select! {
            _ = cancel.cancelled() => return Err(ToolError::Canceled("pod listing canceled".into())),
            pods = client.list_pods(&input.namespace) => pods?,
        };
        let not_running = pods.iter().filter(|p| p.phase != "Running").count();
        Ok(json!({
            "cluster_id": client.cluster_id(),
            "namespace": input.namespace,
            "count": pods.len(),
            "not_running": not_running,
            "pods": pods,
        }))
    }
}
