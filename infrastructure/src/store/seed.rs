//! Seed data for the in-memory adapters.
//!
//! ```json
//! {
//!   "services":  [{"id": "svc-checkout", "name": "checkout", "env": "prod"}],
//!   "releases":  [{"deployment_id": "dep-1", "service_id": "svc-checkout", ...}],
//!   "alerts":    [...],
//!   "hosts":     [...],
//!   "relations": [{"from": "svc-checkout", "to": "host-web-1", "kind": "runs_on"}],
//!   "clusters":  [{"id": "local", "pods": [...]}]
//! }
//! ```

use opsplane_application::ports::cluster::PodSummary;
use opsplane_application::ports::ops_store::{
    AlertRecord, HostRecord, ReleaseRecord, ReleaseStatus, Relation, ServiceRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("could not read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSeed {
    pub id: String,
    #[serde(default)]
    pub pods: Vec<PodSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsSeed {
    pub services: Vec<ServiceRecord>,
    pub releases: Vec<ReleaseRecord>,
    pub alerts: Vec<AlertRecord>,
    pub hosts: Vec<HostRecord>,
    pub relations: Vec<Relation>,
    pub clusters: Vec<ClusterSeed>,
}

impl OpsSeed {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A small fleet used when no seed file is configured.
    pub fn sample() -> Self {
        let service = |id: &str, name: &str, owner: &str, env: &str| ServiceRecord {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
            env: env.into(),
            runtime_type: "k8s".into(),
            status: "healthy".into(),
        };
        let host = |id: &str, hostname: &str, address: &str, env: &str| HostRecord {
            id: id.into(),
            hostname: hostname.into(),
            address: address.into(),
            env: env.into(),
            labels: BTreeMap::from([("role".to_string(), "app".to_string())]),
        };
        let pod = |name: &str, namespace: &str, phase: &str, restarts: u32| PodSummary {
            name: name.into(),
            namespace: namespace.into(),
            phase: phase.into(),
            restarts,
            node: Some("node-a".into()),
        };

        Self {
            services: vec![
                service("svc-checkout", "checkout", "payments", "prod"),
                service("svc-search", "search", "discovery", "prod"),
                service("svc-billing", "billing", "payments", "staging"),
            ],
            releases: vec![
                ReleaseRecord {
                    deployment_id: "dep-101".into(),
                    service_id: "svc-checkout".into(),
                    env: "prod".into(),
                    version: "1.8.2".into(),
                    runtime_type: "k8s".into(),
                    status: ReleaseStatus::Deployed,
                    approved_by: Some("carol".into()),
                    updated_at: 1_700_000_000_000,
                },
                ReleaseRecord {
                    deployment_id: "dep-102".into(),
                    service_id: "svc-search".into(),
                    env: "prod".into(),
                    version: "3.1.0".into(),
                    runtime_type: "k8s".into(),
                    status: ReleaseStatus::Pending,
                    approved_by: None,
                    updated_at: 1_700_000_600_000,
                },
            ],
            alerts: vec![
                AlertRecord {
                    id: "al-1".into(),
                    service_id: "svc-checkout".into(),
                    severity: "critical".into(),
                    title: "checkout p99 latency above 2s".into(),
                    state: "firing".into(),
                    fired_at: 1_700_000_900_000,
                },
                AlertRecord {
                    id: "al-2".into(),
                    service_id: "svc-search".into(),
                    severity: "warning".into(),
                    title: "search index lag".into(),
                    state: "resolved".into(),
                    fired_at: 1_700_000_300_000,
                },
            ],
            hosts: vec![
                host("host-web-1", "web-1.prod", "10.0.0.11", "prod"),
                host("host-web-2", "web-2.prod", "10.0.0.12", "prod"),
                host("host-db-1", "db-1.staging", "10.0.1.21", "staging"),
            ],
            relations: vec![
                Relation {
                    from: "svc-checkout".into(),
                    to: "host-web-1".into(),
                    kind: "runs_on".into(),
                },
                Relation {
                    from: "svc-search".into(),
                    to: "host-web-2".into(),
                    kind: "runs_on".into(),
                },
            ],
            clusters: vec![ClusterSeed {
                id: "local".into(),
                pods: vec![
                    pod("checkout-7d9f", "default", "Running", 0),
                    pod("search-5c2a", "default", "Running", 3),
                    pod("coredns-1a2b", "kube-system", "Running", 0),
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_partial_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{"services": [{"id": "svc-1", "name": "checkout"}],
                "clusters": [{"id": "prod-eu"}]}"#,
        )
        .unwrap();

        let seed = OpsSeed::load(&path).unwrap();
        assert_eq!(seed.services[0].status, "healthy");
        assert!(seed.releases.is_empty());
        assert_eq!(seed.clusters[0].id, "prod-eu");
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = OpsSeed::load(&missing).unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = OpsSeed::load(&bad).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
