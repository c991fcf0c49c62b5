//! Static routing table from intent key to [`CommandAction`].

use crate::tool::{RiskLevel, ToolMode};
use serde::Serialize;

pub const INTENT_AGGREGATE: &str = "ops.aggregate";
pub const INTENT_ROLLBACK: &str = "deployment.rollback";
pub const INTENT_APPROVE: &str = "deployment.approve";
pub const INTENT_RELEASE: &str = "deployment.release";
pub const INTENT_ALERTS: &str = "alert.search";
pub const INTENT_INVENTORY: &str = "inventory.search";
pub const INTENT_STATUS: &str = "service.status";

/// Executors implemented directly by the command bridge instead of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomExecutor {
    /// Concurrent cross-domain read-only fan-out
    Aggregate,
    InventorySearch,
    AlertSearch,
}

/// Declarative description of what an intent does and who may do it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandAction {
    pub intent: &'static str,
    pub domain: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub permission: &'static str,
    pub mode: ToolMode,
    /// Risk of the underlying tool (or of the custom executor)
    pub risk: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<&'static str>,
    pub next_intents: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<CustomExecutor>,
}

static ACTIONS: [CommandAction; 7] = [
    CommandAction {
        intent: INTENT_AGGREGATE,
        domain: "ops",
        description: "Cross-domain summary of services, releases, alerts and relations",
        required: &[],
        permission: "ops:read",
        mode: ToolMode::Readonly,
        risk: RiskLevel::Low,
        tool: None,
        next_intents: &[INTENT_ALERTS, INTENT_STATUS],
        executor: Some(CustomExecutor::Aggregate),
    },
    CommandAction {
        intent: INTENT_ROLLBACK,
        domain: "deployment",
        description: "Roll a service back to its previous release",
        required: &["service_id", "deployment_id", "env"],
        permission: "deployment:write",
        mode: ToolMode::Mutating,
        risk: RiskLevel::High,
        tool: Some("release_rollback"),
        next_intents: &[INTENT_STATUS, INTENT_ALERTS],
        executor: None,
    },
    CommandAction {
        intent: INTENT_APPROVE,
        domain: "deployment",
        description: "Approve a pending release",
        required: &["deployment_id"],
        permission: "deployment:approve",
        mode: ToolMode::Mutating,
        risk: RiskLevel::Medium,
        tool: Some("release_approve"),
        next_intents: &[INTENT_STATUS],
        executor: None,
    },
    CommandAction {
        intent: INTENT_RELEASE,
        domain: "deployment",
        description: "Trigger a release of a service version",
        required: &["service_id", "deployment_id", "env", "version", "runtime_type"],
        permission: "deployment:write",
        mode: ToolMode::Mutating,
        risk: RiskLevel::High,
        tool: Some("release_trigger"),
        next_intents: &[INTENT_APPROVE, INTENT_STATUS],
        executor: None,
    },
    CommandAction {
        intent: INTENT_ALERTS,
        domain: "alert",
        description: "Search alerts by keyword, severity or status",
        required: &[],
        permission: "alert:read",
        mode: ToolMode::Readonly,
        risk: RiskLevel::Low,
        tool: None,
        next_intents: &[INTENT_STATUS, INTENT_ROLLBACK],
        executor: Some(CustomExecutor::AlertSearch),
    },
    CommandAction {
        intent: INTENT_INVENTORY,
        domain: "inventory",
        description: "Search services and hosts in the inventory",
        required: &[],
        permission: "inventory:read",
        mode: ToolMode::Readonly,
        risk: RiskLevel::Low,
        tool: None,
        next_intents: &[INTENT_STATUS],
        executor: Some(CustomExecutor::InventorySearch),
    },
    CommandAction {
        intent: INTENT_STATUS,
        domain: "service",
        description: "Show the current state of a service",
        required: &["service_id"],
        permission: "service:read",
        mode: ToolMode::Readonly,
        risk: RiskLevel::Low,
        tool: Some("service_status"),
        next_intents: &[INTENT_ALERTS, INTENT_RELEASE],
        executor: None,
    },
];

/// Every routable action, in detection priority order.
pub fn command_actions() -> &'static [CommandAction] {
    &ACTIONS
}

pub fn find_action(intent: &str) -> Option<&'static CommandAction> {
    ACTIONS.iter().find(|a| a.intent == intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_has_exactly_one_executor_path() {
        for action in command_actions() {
            assert!(
                action.tool.is_some() ^ action.executor.is_some(),
                "{} must name a tool or a custom executor",
                action.intent
            );
        }
    }

    #[test]
    fn test_next_intents_are_routable() {
        for action in command_actions() {
            for next in action.next_intents {
                assert!(find_action(next).is_some(), "{} -> {}", action.intent, next);
            }
        }
    }

    #[test]
    fn test_custom_executors_are_readonly() {
        for action in command_actions().iter().filter(|a| a.executor.is_some()) {
            assert_eq!(action.mode, ToolMode::Readonly, "{}", action.intent);
        }
    }

    #[test]
    fn test_find_action() {
        let release = find_action(INTENT_RELEASE).unwrap();
        assert_eq!(release.tool, Some("release_trigger"));
        assert_eq!(release.required.len(), 5);
        assert!(find_action("nope").is_none());
    }
}
