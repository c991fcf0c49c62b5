//! In-memory ops store, seedable from a JSON file.

mod seed;

pub use seed::{ClusterSeed, OpsSeed, SeedError};

use async_trait::async_trait;
use opsplane_application::ports::ops_store::{
    AlertQuery, AlertRecord, HostRecord, InventoryItem, OpsStore, ReleaseRecord, ReleaseRequest,
    ReleaseStatus, Relation, ServiceRecord, StoreError,
};
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// [`OpsStore`] over process memory. Releases are the only mutable table.
pub struct InMemoryOpsStore {
    services: Vec<ServiceRecord>,
    releases: RwLock<Vec<ReleaseRecord>>,
    alerts: Vec<AlertRecord>,
    hosts: Vec<HostRecord>,
    relations: Vec<Relation>,
}

impl InMemoryOpsStore {
    pub fn from_seed(seed: OpsSeed) -> Self {
        info!(
            services = seed.services.len(),
            releases = seed.releases.len(),
            alerts = seed.alerts.len(),
            hosts = seed.hosts.len(),
            "Ops store seeded"
        );
        Self {
            services: seed.services,
            releases: RwLock::new(seed.releases),
            alerts: seed.alerts,
            hosts: seed.hosts,
            relations: seed.relations,
        }
    }

    pub fn empty() -> Self {
        Self::from_seed(OpsSeed::default())
    }

    fn service(&self, id: &str) -> Result<&ServiceRecord, StoreError> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "service",
                id: id.to_string(),
            })
    }

    fn update_release(
        &self,
        find: impl Fn(&ReleaseRecord) -> bool,
        missing_id: &str,
        apply: impl FnOnce(&mut ReleaseRecord) -> Result<(), StoreError>,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        let mut releases = self.releases.write().unwrap_or_else(PoisonError::into_inner);
        let record = releases
            .iter_mut()
            .find(|r| find(r))
            .ok_or_else(|| StoreError::NotFound {
                kind: "release",
                id: missing_id.to_string(),
            })?;
        apply(record)?;
        record.updated_at = now;
        Ok(record.clone())
    }
}

fn matches_keyword(keyword: &str, fields: &[&str]) -> bool {
    fields.iter().any(|f| f.to_lowercase().contains(keyword))
}

#[async_trait]
impl OpsStore for InMemoryOpsStore {
    async fn list_services(&self, limit: usize) -> Result<Vec<ServiceRecord>, StoreError> {
        Ok(self.services.iter().take(limit).cloned().collect())
    }

    async fn get_service(&self, id: &str) -> Result<ServiceRecord, StoreError> {
        self.service(id).cloned()
    }

    async fn recent_releases(&self, limit: usize) -> Result<Vec<ReleaseRecord>, StoreError> {
        let mut releases = self
            .releases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        releases.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        releases.truncate(limit);
        Ok(releases)
    }

    async fn search_alerts(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, StoreError> {
        let mut alerts: Vec<AlertRecord> = self
            .alerts
            .iter()
            .filter(|a| !query.firing_only || a.is_firing())
            .filter(|a| query.service_id.as_ref().is_none_or(|s| &a.service_id == s))
            .filter(|a| {
                query
                    .severity
                    .as_ref()
                    .is_none_or(|s| a.severity.eq_ignore_ascii_case(s))
            })
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.fired_at.cmp(&a.fired_at));
        alerts.truncate(query.limit.max(1));
        Ok(alerts)
    }

    async fn count_relations(&self) -> Result<usize, StoreError> {
        Ok(self.relations.len())
    }

    async fn search_inventory(
        &self,
        keyword: Option<&str>,
        env: Option<&str>,
        limit: usize,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let keyword = keyword.map(|k| k.trim().to_lowercase()).unwrap_or_default();
        let env_matches = |candidate: &str| env.is_none_or(|e| candidate.eq_ignore_ascii_case(e));

        let services = self
            .services
            .iter()
            .filter(|s| env_matches(&s.env) && matches_keyword(&keyword, &[s.id.as_str(), s.name.as_str()]))
            .map(|s| InventoryItem {
                kind: "service".into(),
                id: s.id.clone(),
                name: s.name.clone(),
                env: s.env.clone(),
            });
        let hosts = self
            .hosts
            .iter()
            .filter(|h| env_matches(&h.env) && matches_keyword(&keyword, &[h.id.as_str(), h.hostname.as_str()]))
            .map(|h| InventoryItem {
                kind: "host".into(),
                id: h.id.clone(),
                name: h.hostname.clone(),
                env: h.env.clone(),
            });
        Ok(services.chain(hosts).take(limit).collect())
    }

    async fn trigger_release(
        &self,
        request: ReleaseRequest,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        self.service(&request.service_id)?;
        let mut releases = self.releases.write().unwrap_or_else(PoisonError::into_inner);
        if releases
            .iter()
            .any(|r| r.deployment_id == request.deployment_id)
        {
            return Err(StoreError::Conflict(format!(
                "deployment {} already exists",
                request.deployment_id
            )));
        }
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
        releases.push(record.clone());
        info!(deployment = %record.deployment_id, service = %record.service_id, "Release triggered");
        Ok(record)
    }

    async fn approve_release(
        &self,
        deployment_id: &str,
        approver: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        self.update_release(
            |r| r.deployment_id == deployment_id,
            deployment_id,
            |r| {
                if r.status != ReleaseStatus::Pending {
                    return Err(StoreError::Conflict(format!(
                        "deployment {} is {:?}, not pending",
                        r.deployment_id, r.status
                    )));
                }
                r.status = ReleaseStatus::Approved;
                r.approved_by = Some(approver.to_string());
                Ok(())
            },
            now,
        )
    }

    async fn rollback_release(
        &self,
        service_id: &str,
        deployment_id: &str,
        env: &str,
        now: u64,
    ) -> Result<ReleaseRecord, StoreError> {
        self.update_release(
            |r| r.deployment_id == deployment_id && r.service_id == service_id && r.env == env,
            deployment_id,
            |r| {
                if r.status == ReleaseStatus::RolledBack {
                    return Err(StoreError::Conflict(format!(
                        "deployment {} is already rolled back",
                        r.deployment_id
                    )));
                }
                r.status = ReleaseStatus::RolledBack;
                Ok(())
            },
            now,
        )
    }
}
