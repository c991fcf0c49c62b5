//! Tool implementations for the control plane
//!
//! Thin bodies over the ports: each tool decodes its typed input, calls one
//! collaborator and shapes the result. Policy, deadlines and retries belong
//! to the execution engine.
//!
//! | Tool | Mode | Risk | Permission |
//! |---|---|---|---|
//! | `host_logs` | readonly | low | `host:read` |
//! | `host_exec` | mutating | high | `host:exec` |
//! | `cluster_pods` | readonly | low | `cluster:read` |
//! | `service_status` | readonly | low | `service:read` |
//! | `release_trigger` | mutating | high | `deployment:write` |
//! | `release_approve` | mutating | medium | `deployment:approve` |
//! | `release_rollback` | mutating | high | `deployment:write` |

pub mod cluster;
pub mod host;
pub mod release;
pub mod service;

use opsplane_application::ports::clock::Clock;
use opsplane_application::ports::cluster::ClusterClientResolver;
use opsplane_application::ports::ops_store::OpsStore;
use opsplane_application::ports::remote_executor::RemoteExecutor;
use opsplane_application::ports::tool_registry::ToolRegistry;
use std::sync::Arc;

/// Collaborators the tool bodies need.
#[derive(Clone)]
pub struct ToolDeps {
    pub runner: Arc<dyn RemoteExecutor>,
    pub clusters: Arc<dyn ClusterClientResolver>,
    pub ops: Arc<dyn OpsStore>,
    pub clock: Arc<dyn Clock>,
}

/// Registry with every built-in tool.
pub fn default_tool_registry(deps: &ToolDeps) -> ToolRegistry {
    ToolRegistry::new()
        .register(host::HostLogsTool::new(Arc::clone(&deps.runner)))
        .register(host::HostExecTool::new(Arc::clone(&deps.runner)))
        .register(cluster::ClusterPodsTool::new(Arc::clone(&deps.clusters)))
        .register(service::ServiceStatusTool::new(Arc::clone(&deps.ops)))
        .register(release::ReleaseTriggerTool::new(
            Arc::clone(&deps.ops),
            Arc::clone(&deps.clock),
        ))
        .register(release::ReleaseApproveTool::new(
            Arc::clone(&deps.ops),
            Arc::clone(&deps.clock),
        ))
        .register(release::ReleaseRollbackTool::new(
            Arc::clone(&deps.ops),
            Arc::clone(&deps.clock),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterRegistry;
    use crate::runner::HostCommandRunner;
    use crate::store::{InMemoryOpsStore, OpsSeed};
    use opsplane_application::ports::clock::SystemClock;
    use opsplane_domain::command::command_actions;

    fn deps() -> ToolDeps {
        let seed = OpsSeed::sample();
        ToolDeps {
            runner: Arc::new(HostCommandRunner::new()),
            clusters: Arc::new(ClusterRegistry::from_seeds(&seed.clusters, Some("local"))),
            ops: Arc::new(InMemoryOpsStore::from_seed(seed)),
            clock: Arc::new(SystemClock),
        }
    }

    #[test]
    fn test_default_registry_lists_all_tools() {
        let registry = default_tool_registry(&deps());
        assert_eq!(
            registry.available_tools(),
            vec![
                "cluster_pods",
                "host_exec",
                "host_logs",
                "release_approve",
                "release_rollback",
                "release_trigger",
                "service_status",
            ]
        );
        let mutating: Vec<&str> = registry
            .metas()
            .into_iter()
            .filter(|m| m.is_mutating())
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            mutating,
            vec!["host_exec", "release_approve", "release_rollback", "release_trigger"]
        );
    }

    #[test]
    fn test_every_routed_intent_has_a_tool() {
        let registry = default_tool_registry(&deps());
        for action in command_actions() {
            if let Some(tool) = action.tool {
                let meta = registry.meta(tool).unwrap();
                assert_eq!(meta.mode, action.mode, "{}", action.intent);
                assert_eq!(meta.risk, action.risk, "{}", action.intent);
                assert_eq!(meta.permission, action.permission, "{}", action.intent);
            }
        }
    }
}
