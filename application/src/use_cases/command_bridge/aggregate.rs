//! Cross-domain aggregation for the `ops.aggregate` intent.
//!
//! ```text
//!            ┌── services ──┐
//!  permits   ├── releases ──┤   mpsc(N)   ┌──────────────┐
//! (max_par) ─┼── alerts ────┼────────────▶│ fan-in until │──▶ AggregateReport
//!            └── relations ─┘             │ all or timer │
//!                  ▲                       └──────────────┘
//!                  └──── CancellationToken (overall deadline)
//! ```
//!
//! A failing domain is recorded and the rest still report.

use crate::config::AggregateParams;
use crate::ports::ops_store::{AlertQuery, OpsStore};
use opsplane_domain::{ParamMap, param_i64};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AggregateDomain {
    Services,
    Releases,
    Alerts,
    Relations,
}

impl AggregateDomain {
    pub const ALL: [AggregateDomain; 4] = [
        AggregateDomain::Services,
        AggregateDomain::Releases,
        AggregateDomain::Alerts,
        AggregateDomain::Relations,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AggregateDomain::Services => "services",
            AggregateDomain::Releases => "releases",
            AggregateDomain::Alerts => "alerts",
            AggregateDomain::Relations => "relations",
        }
    }

    async fn query(self, ops: &dyn OpsStore, limit: usize) -> Result<Value, String> {
        match self {
            AggregateDomain::Services => {
                let items = ops.list_services(limit).await.map_err(|e| e.to_string())?;
                Ok(json!({ "count": items.len(), "items": items }))
            }
            AggregateDomain::Releases => {
                let items = ops.recent_releases(limit).await.map_err(|e| e.to_string())?;
                Ok(json!({ "count": items.len(), "items": items }))
            }
            AggregateDomain::Alerts => {
                let query = AlertQuery {
                    firing_only: true,
                    limit,
                    ..AlertQuery::default()
                };
                let items = ops.search_alerts(&query).await.map_err(|e| e.to_string())?;
                Ok(json!({ "count": items.len(), "items": items }))
            }
            AggregateDomain::Relations => {
                let count = ops.count_relations().await.map_err(|e| e.to_string())?;
                Ok(json!({ "count": count }))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateFailure {
    pub domain: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Per-domain payloads, keyed by domain name; only answering domains appear.
    pub details: BTreeMap<String, Value>,
    pub answered: Vec<String>,
    pub failures: Vec<AggregateFailure>,
    pub max_parallel: usize,
    pub timeout_ms: u64,
    pub limit: usize,
    pub elapsed_ms: u64,
}

impl AggregateReport {
    pub fn failed_domains(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.domain.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        let total = self.answered.len() + self.failures.len();
        if self.failures.is_empty() {
            format!("{}/{} domains answered", self.answered.len(), total)
        } else {
            format!(
                "{}/{} domains answered; failed: {}",
                self.answered.len(),
                total,
                self.failed_domains().join(", ")
            )
        }
    }
}

pub struct Aggregator {
    ops: Arc<dyn OpsStore>,
    params: AggregateParams,
}

impl Aggregator {
    pub fn new(ops: Arc<dyn OpsStore>, params: AggregateParams) -> Self {
        Self { ops, params }
    }

    /// Run every domain query; reads `limit`, `max_parallel` and `timeout_sec`.
    pub async fn run(&self, params: &ParamMap) -> AggregateReport {
        let domains = AggregateDomain::ALL;
        let limit = self.params.row_limit(param_i64(params, "limit"));
        let max_parallel = self
            .params
            .parallelism(param_i64(params, "max_parallel"), domains.len());
        let deadline = self.params.deadline(param_i64(params, "timeout_sec"));
        self.fan_out(&domains, limit, max_parallel, deadline).await
    }

    async fn fan_out(
        &self,
        domains: &[AggregateDomain],
        limit: usize,
        max_parallel: usize,
        deadline: Duration,
    ) -> AggregateReport {
        let started = Instant::now();
        let cancel = CancellationToken::new();
        let permits = Arc::new(Semaphore::new(max_parallel));
        let (tx, mut rx) = mpsc::channel(domains.len().max(1));

        let mut join_set = JoinSet::new();
        for &domain in domains {
            let ops = Arc::clone(&self.ops);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let tx = tx.clone();
            join_set.spawn(async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => Err("canceled: aggregate deadline reached".to_string()),
                    outcome = async {
                        let _permit = permits.acquire().await.map_err(|e| e.to_string())?;
                        domain.query(ops.as_ref(), limit).await
                    } => outcome,
                };
                // Capacity equals the task count, so this never waits.
                let _ = tx.send((domain, outcome)).await;
            });
        }
        drop(tx);

        let mut details = BTreeMap::new();
        let mut failures = Vec::new();
        let mut outstanding: Vec<AggregateDomain> = domains.to_vec();
        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);

        while !outstanding.is_empty() {
            tokio::select! {
                received = rx.recv() => match received {
                    Some((domain, outcome)) => {
                        outstanding.retain(|d| *d != domain);
                        match outcome {
                            Ok(value) => {
                                debug!(domain = domain.key(), "Aggregate domain answered");
                                details.insert(domain.key().to_string(), value);
                            }
                            Err(error) => {
                                warn!(domain = domain.key(), error = %error, "Aggregate domain failed");
                                failures.push(AggregateFailure { domain: domain.key().to_string(), error });
                            }
                        }
                    }
                    None => break,
                },
                _ = &mut timer => {
                    warn!(deadline_ms = deadline.as_millis() as u64, pending = outstanding.len(), "Aggregate deadline reached");
                    break;
                }
            }
        }
        cancel.cancel();

        for domain in outstanding {
            failures.push(AggregateFailure {
                domain: domain.key().to_string(),
                error: format!("timed out after {}ms", deadline.as_millis()),
            });
        }
        failures.sort_by(|a, b| a.domain.cmp(&b.domain));
        join_set.abort_all();

        let report = AggregateReport {
            answered: details.keys().cloned().collect(),
            details,
            failures,
            max_parallel,
            timeout_ms: deadline.as_millis() as u64,
            limit,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(summary = %report.summary(), elapsed_ms = report.elapsed_ms, "Aggregate finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureOps;
    use serde_json::json;

    fn params(value: Value) -> ParamMap {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_all_domains_answer() {
        let aggregator = Aggregator::new(Arc::new(FixtureOps::seeded()), AggregateParams::default());
        let report = aggregator
            .run(&params(json!({"limit": 5, "max_parallel": 2, "timeout_sec": 3})))
            .await;

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        for key in ["services", "releases", "alerts", "relations"] {
            assert!(report.details[key]["count"].as_u64().unwrap() >= 1, "{key}");
        }
        assert_eq!(report.max_parallel, 2);
        assert_eq!(report.limit, 5);
        assert_eq!(report.timeout_ms, 3_000);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_others() {
        let ops = FixtureOps::seeded().failing_alerts();
        let aggregator = Aggregator::new(Arc::new(ops), AggregateParams::default());
        let report = aggregator.run(&ParamMap::new()).await;

        assert_eq!(report.failed_domains(), vec!["alerts"]);
        assert_eq!(report.answered, vec!["relations", "releases", "services"]);
        assert!(!report.details.contains_key("alerts"));
        assert_eq!(report.summary(), "3/4 domains answered; failed: alerts");
    }

    #[tokio::test]
    async fn test_overall_deadline_names_slow_domain() {
        let ops = FixtureOps::seeded().slow_services(Duration::from_secs(5));
        let aggregator = Aggregator::new(Arc::new(ops), AggregateParams::default());
        let started = Instant::now();
        let report = aggregator
            .fan_out(&AggregateDomain::ALL, 5, 4, Duration::from_millis(100))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.failed_domains(), vec!["services"]);
        assert_eq!(report.answered.len(), 3);
    }

    #[tokio::test]
    async fn test_parallelism_is_clamped() {
        let aggregator = Aggregator::new(Arc::new(FixtureOps::seeded()), AggregateParams::default());
        let report = aggregator
            .run(&params(json!({"max_parallel": 99, "timeout_sec": 600})))
            .await;
        assert_eq!(report.max_parallel, 4);
        assert_eq!(report.timeout_ms, 30_000);
    }
}
