//! Persistent store port for operational entities.
//!
//! Only the query surface the control plane consumes is defined here:
//! services, releases, alerts, hosts and CMDB relations. The schema behind
//! it belongs to the adapter.

use async_trait::async_trait;
use opsplane_domain::ToolError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ToolError::InvalidParam(err.to_string()),
            StoreError::Conflict(msg) => ToolError::ParamConflict(msg),
            StoreError::Unavailable(msg) => ToolError::Untyped(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub runtime_type: String,
    #[serde(default = "default_service_status")]
    pub status: String,
}

fn default_service_status() -> String {
    "healthy".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Pending,
    Approved,
    Deployed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub deployment_id: String,
    pub service_id: String,
    pub env: String,
    pub version: String,
    #[serde(default)]
    pub runtime_type: String,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Unix epoch milliseconds
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub service_id: String,
    pub severity: String,
    pub title: String,
    /// `firing` or `resolved`
    pub state: String,
    #[serde(default)]
    pub fired_at: u64,
}

impl AlertRecord {
    pub fn is_firing(&self) -> bool {
        self.state == "firing"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// CMDB edge between two entities (e.g. service → host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertQuery {
    pub service_id: Option<String>,
    pub severity: Option<String>,
    pub firing_only: bool,
    pub limit: usize,
}

/// One hit of an inventory search: a service or a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub kind: String,
    pub id: String,
    pub name: String,
    pub env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub service_id: String,
    pub deployment_id: String,
    pub env: String,
    pub version: String,
    pub runtime_type: String,
}

#[async_trait]
pub trait OpsStore: Send + Sync {
    async fn list_services(&self, limit: usize) -> Result<Vec<ServiceRecord>, StoreError>;

    async fn get_service(&self, id: &str) -> Result<ServiceRecord, StoreError>;

    /// Most recently updated first.
    async fn recent_releases(&self, limit: usize) -> Result<Vec<ReleaseRecord>, StoreError>;

    async fn search_alerts(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, StoreError>;

    async fn count_relations(&self) -> Result<usize, StoreError>;

    /// Case-insensitive substring search over service and host names and ids.
    async fn search_inventory(
        &self,
        keyword: Option<&str>,
        env: Option<&str>,
        limit: usize,
    ) -> Result<Vec<InventoryItem>, StoreError>;

    async fn trigger_release(
        &self,
        request: ReleaseRequest,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError>;

    async fn approve_release(
        &self,
        deployment_id: &str,
        approver: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError>;

    async fn rollback_release(
        &self,
        service_id: &str,
        deployment_id: &str,
        env: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError>;
}
