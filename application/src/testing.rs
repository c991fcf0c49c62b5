//! Shared fixtures for the application tests.

use crate::ports::ops_store::{
    AlertQuery, AlertRecord, InventoryItem, OpsStore, ReleaseRecord, ReleaseRequest,
    ReleaseStatus, Relation, ServiceRecord, StoreError,
};
use crate::ports::permission::PermissionChecker;
use async_trait::async_trait;
use opsplane_domain::{RiskLevel, ToolMeta, ToolMode, any_grant_satisfies};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Caller → grant list, plus an admin set.
#[derive(Default)]
pub struct GrantTable {
    grants: HashMap<String, Vec<String>>,
    admins: HashSet<String>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, caller: &str, codes: &[&str]) -> Self {
        self.grants
            .entry(caller.to_string())
            .or_default()
            .extend(codes.iter().map(|c| c.to_string()));
        self
    }

    pub fn admin(mut self, caller: &str) -> Self {
        self.admins.insert(caller.to_string());
        self
    }
}

impl PermissionChecker for GrantTable {
    fn has_permission(&self, caller: &str, code: &str) -> bool {
        self.is_admin(caller)
            || self
                .grants
                .get(caller)
                .is_some_and(|g| any_grant_satisfies(g.iter().map(String::as_str), code))
    }

    fn is_admin(&self, caller: &str) -> bool {
        self.admins.contains(caller)
    }
}

pub fn readonly_meta(name: &str, permission: &str) -> ToolMeta {
    ToolMeta::new(name, "readonly fixture", ToolMode::Readonly, RiskLevel::Low, permission)
}

pub fn mutating_meta(name: &str, permission: &str) -> ToolMeta {
    ToolMeta::new(name, "mutating fixture", ToolMode::Mutating, RiskLevel::High, permission)
}

pub fn release_meta() -> ToolMeta {
    mutating_meta("release_trigger", "deployment:write")
}

/// In-memory [`OpsStore`] with one row per domain and switchable failures.
pub struct FixtureOps {
    services: Vec<ServiceRecord>,
    releases: RwLock<Vec<ReleaseRecord>>,
    alerts: Vec<AlertRecord>,
    relations: Vec<Relation>,
    pub fail_alerts: AtomicBool,
    pub slow_services: RwLock<Option<Duration>>,
}

impl FixtureOps {
    pub fn seeded() -> Self {
        Self {
            services: vec![ServiceRecord {
                id: "svc-1".into(),
                name: "checkout".into(),
                owner: "payments".into(),
                env: "prod".into(),
                runtime_type: "k8s".into(),
                status: "healthy".into(),
            }],
            releases: RwLock::new(vec![ReleaseRecord {
                deployment_id: "dep-1".into(),
                service_id: "svc-1".into(),
                env: "prod".into(),
                version: "1.4.0".into(),
                runtime_type: "k8s".into(),
                status: ReleaseStatus::Deployed,
                approved_by: Some("carol".into()),
                updated_at: 10,
            }]),
            alerts: vec![AlertRecord {
                id: "al-1".into(),
                service_id: "svc-1".into(),
                severity: "critical".into(),
                title: "checkout 5xx rate".into(),
                state: "firing".into(),
                fired_at: 20,
            }],
            relations: vec![Relation {
                from: "svc-1".into(),
                to: "host-1".into(),
                kind: "runs_on".into(),
            }],
            fail_alerts: AtomicBool::new(false),
            slow_services: RwLock::new(None),
        }
    }

    pub fn failing_alerts(self) -> Self {
        self.fail_alerts.store(true, Ordering::SeqCst);
        self
    }

    pub fn slow_services(self, delay: Duration) -> Self {
        if let Ok(mut slot) = self.slow_services.write() {
            *slot = Some(delay);
        }
        self
    }
}

#[async_trait]
impl OpsStore for FixtureOps {
    async fn list_services(&self, limit: usize) -> Result<Vec<ServiceRecord>, StoreError> {
        let delay = self.slow_services.read().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.services.iter().take(limit).cloned().collect())
    }

    async fn get_service(&self, id: &str) -> Result<ServiceRecord, StoreError> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "service",
                id: id.to_string(),
            })
    }

    async fn recent_releases(&self, limit: usize) -> Result<Vec<ReleaseRecord>, StoreError> {
        let releases = self
            .releases
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(releases.iter().take(limit).cloned().collect())
    }

    async fn search_alerts(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, StoreError> {
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("alert backend down".into()));
        }
        Ok(self
            .alerts
            .iter()
            .filter(|a| !query.firing_only || a.is_firing())
            .filter(|a| query.service_id.as_ref().is_none_or(|s| &a.service_id == s))
            .take(query.limit.max(1))
            .cloned()
            .collect())
    }

    async fn count_relations(&self) -> Result<usize, StoreError> {
        Ok(self.relations.len())
    }

    async fn search_inventory(
        &self,
        keyword: Option<&str>,
        _env: Option<&str>,
        limit: usize,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self
            .services
            .iter()
            .filter(|s| keyword.is_none_or(|k| s.name.contains(k)))
            .take(limit)
            .map(|s| InventoryItem {
                kind: "service".into(),
                id: s.id.clone(),
                name: s.name.clone(),
                env: s.env.clone(),
            })
            .collect())
    }

    async fn trigger_release(
        &self,
        request: ReleaseRequest,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        let record = ReleaseRecord {
            deployment_id: request.deployment_id,
            service_id: request.service_id,
            env: request.env,
            version: request.version,
            runtime_type: request.runtime_type,
            status: ReleaseStatus::Pending,
            approved_by: None,
            updated_at: now,
        };
        let mut releases = self
            .releases
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        releases.insert(0, record.clone());
        Ok(record)
    }

    async fn approve_release(
        &self,
        deployment_id: &str,
        approver: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        self.update_release(deployment_id, now, |r| {
            r.status = ReleaseStatus::Approved;
            r.approved_by = Some(approver.to_string());
        })
    }

    async fn rollback_release(
        &self,
        _service_id: &str,
        deployment_id: &str,
        _env: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        self.update_release(deployment_id, now, |r| r.status = ReleaseStatus::RolledBack)
    }
}

impl FixtureOps {
    fn update_release(
        &self,
        deployment_id: &str,
        now: u64,
        apply: impl FnOnce(&mut ReleaseRecord),
    ) -> Result<ReleaseRecord, StoreError> {
        let mut releases = self
            .releases
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let record = releases
            .iter_mut()
            .find(|r| r.deployment_id == deployment_id)
            .ok_or(StoreError::NotFound {
                kind: "release",
                id: deployment_id.to_string(),
            })?;
        apply(record);
        record.updated_at = now;
        Ok(record.clone())
    }
}

/// Tool that echoes its parameters back; the metadata is supplied.
pub struct EchoTool {
    meta: ToolMeta,
}

impl EchoTool {
    pub fn new(meta: ToolMeta) -> Self {
        Self { meta }
    }
}

#[async_trait]
impl crate::ports::tool_registry::Tool for EchoTool {
    type Input = opsplane_domain::ParamMap;

    fn meta(&self) -> ToolMeta {
        self.meta.clone()
    }

    async fn call(
        &self,
        input: opsplane_domain::ParamMap,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Result<serde_json::Value, opsplane_domain::ToolError> {
        Ok(serde_json::json!({ "tool": self.meta.name, "params": input }))
    }
}

/// Registry holding echo versions of every tool the command table routes to.
pub fn command_registry() -> crate::ports::tool_registry::ToolRegistry {
    let deployment = |name: &str, risk: RiskLevel, permission: &str| {
        ToolMeta::new(name, "fixture", ToolMode::Mutating, risk, permission)
    };
    crate::ports::tool_registry::ToolRegistry::new()
        .register(EchoTool::new(deployment(
            "release_rollback",
            RiskLevel::High,
            "deployment:write",
        )))
        .register(EchoTool::new(deployment(
            "release_trigger",
            RiskLevel::High,
            "deployment:write",
        )))
        .register(EchoTool::new(deployment(
            "release_approve",
            RiskLevel::Medium,
            "deployment:approve",
        )))
        .register(EchoTool::new(
            readonly_meta("service_status", "service:read")
                .with_field("service_id", "string", "Service", true),
        ))
}
