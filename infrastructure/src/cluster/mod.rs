//! Cluster client resolver over seeded, in-process clusters.

use crate::store::ClusterSeed;
use async_trait::async_trait;
use opsplane_application::ports::cluster::{
    ClusterClient, ClusterClientResolver, ClusterError, PodSummary,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// A cluster whose pod list is fixed at construction.
pub struct StaticClusterClient {
    id: String,
    pods: Vec<PodSummary>,
    namespaces: BTreeSet<String>,
}

impl StaticClusterClient {
    pub fn new(id: impl Into<String>, pods: Vec<PodSummary>) -> Self {
        let mut namespaces: BTreeSet<String> = pods.iter().map(|p| p.namespace.clone()).collect();
        namespaces.insert("default".to_string());
        Self {
            id: id.into(),
            pods,
            namespaces,
        }
    }
}

#[async_trait]
impl ClusterClient for StaticClusterClient {
    fn cluster_id(&self) -> &str {
        &self.id
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError> {
        if !self.namespaces.contains(namespace) {
            return Err(ClusterError::NamespaceNotFound(namespace.to_string()));
        }
        Ok(self
            .pods
            .iter()
            .filter(|p| p.namespace == namespace)
            .cloned()
            .collect())
    }
}

/// Cluster id → client, with an optional default for absent or unknown ids.
#[derive(Default)]
pub struct ClusterRegistry {
    clients: HashMap<String, Arc<dyn ClusterClient>>,
    default: Option<String>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: &[ClusterSeed], default: Option<&str>) -> Self {
        let registry = seeds.iter().fold(Self::new(), |registry, seed| {
            registry.with_client(Arc::new(StaticClusterClient::new(
                seed.id.clone(),
                seed.pods.clone(),
            )))
        });
        match default {
            Some(id) => registry.with_default(id),
            None => registry,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.clients.insert(client.cluster_id().to_string(), client);
        self
    }

    pub fn with_default(mut self, cluster_id: &str) -> Self {
        self.default = Some(cluster_id.to_string());
        self
    }

    pub fn cluster_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ClusterClientResolver for ClusterRegistry {
    fn resolve(&self, cluster_id: Option<&str>) -> Result<Arc<dyn ClusterClient>, ClusterError> {
        let requested = cluster_id.map(str::trim).filter(|id| !id.is_empty());
        if let Some(client) = requested.and_then(|id| self.clients.get(id)) {
            return Ok(Arc::clone(client));
        }
        let fallback = self
            .default
            .as_deref()
            .and_then(|id| self.clients.get(id))
            .ok_or_else(|| ClusterError::UnknownCluster(requested.unwrap_or("<none>").to_string()))?;
        debug!(requested = ?requested, fallback = %fallback.cluster_id(), "Using default cluster client");
        Ok(Arc::clone(fallback))
    }
}
