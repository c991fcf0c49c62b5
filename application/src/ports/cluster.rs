//! Cluster API client port.

use async_trait::async_trait;
use opsplane_domain::ToolError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("unknown cluster '{0}' and no default client configured")]
    UnknownCluster(String),

    #[error("namespace '{0}' not found")]
    NamespaceNotFound(String),

    #[error("cluster request failed: {0}")]
    Request(String),
}

impl From<ClusterError> for ToolError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::NamespaceNotFound(ns) => {
                ToolError::InvalidParam(format!("namespace '{}' not found", ns))
            }
            other => ToolError::Failed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    #[serde(default)]
    pub restarts: u32,
    #[serde(default)]
    pub node: Option<String>,
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    fn cluster_id(&self) -> &str;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError>;
}

/// Maps a cluster id to a client, falling back to the default client when
/// the id is absent or unknown.
pub trait ClusterClientResolver: Send + Sync {
    fn resolve(&self, cluster_id: Option<&str>) -> Result<Arc<dyn ClusterClient>, ClusterError>;
}
