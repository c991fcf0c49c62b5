//! Command plans, risk classification and the plan fingerprint.

use super::action::CommandAction;
use crate::tool::{ParamMap, RiskLevel, ToolMode, canonical_json, is_empty_value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Risk of a command as the operator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandRisk {
    Readonly,
    Low,
    High,
}

impl CommandRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandRisk::Readonly => "readonly",
            CommandRisk::Low => "low",
            CommandRisk::High => "high",
        }
    }

    /// High-risk commands need an approved ticket before they execute.
    pub fn needs_approval(&self) -> bool {
        matches!(self, CommandRisk::High)
    }
}

impl std::fmt::Display for CommandRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Readonly → `readonly`; mutating over a high-risk tool → `high`; else `low`.
pub fn classify_risk(mode: ToolMode, tool_risk: RiskLevel) -> CommandRisk {
    match (mode, tool_risk) {
        (ToolMode::Readonly, _) => CommandRisk::Readonly,
        (ToolMode::Mutating, RiskLevel::High) => CommandRisk::High,
        (ToolMode::Mutating, _) => CommandRisk::Low,
    }
}

/// Required fields that are absent or blank after trimming.
pub fn missing_fields(action: &CommandAction, params: &ParamMap) -> Vec<String> {
    action
        .required
        .iter()
        .filter(|field| is_empty_value(params.get(**field)))
        .map(|field| field.to_string())
        .collect()
}

/// Operator-facing question for a missing field.
pub fn field_prompt(field: &str) -> String {
    match field {
        "service_id" => "Which service? Provide service_id=<id>.".to_string(),
        "deployment_id" => "Which deployment? Provide deployment_id=<id>.".to_string(),
        "env" => "Target environment? Provide env=<dev|staging|prod>.".to_string(),
        "version" => "Which version should be released? Provide version=<tag>.".to_string(),
        "runtime_type" => "Runtime type? Provide runtime_type=<k8s|vm|container>.".to_string(),
        other => format!("Please provide {other}=<value>."),
    }
}

pub fn field_prompts(missing: &[String]) -> BTreeMap<String, String> {
    missing
        .iter()
        .map(|f| (f.clone(), field_prompt(f)))
        .collect()
}

/// Hex SHA-256 over `text | intent | canonical-json(params)`.
pub fn plan_hash(text: &str, intent: &str, params: &ParamMap) -> String {
    let canonical = canonical_json(&serde_json::Value::Object(params.clone()));
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"|");
    hasher.update(intent.as_bytes());
    hasher.update(b"|");
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub order: usize,
    pub action: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPlan {
    pub steps: Vec<PlanStep>,
    pub risk: CommandRisk,
}

impl CommandPlan {
    /// Structured steps for running `action` with `params`.
    pub fn for_action(action: &CommandAction, params: &ParamMap) -> Self {
        let risk = classify_risk(action.mode, action.risk);
        let mut steps = vec![(
            "validate",
            format!("check {} required field(s) and permission {}", action.required.len(), action.permission),
        )];
        if risk.needs_approval() {
            steps.push(("approve", "obtain an approved ticket from a reviewer".to_string()));
        }
        let target = match (action.tool, action.executor) {
            (Some(tool), _) => format!("run tool {tool} with {} parameter(s)", params.len()),
            (None, Some(executor)) => format!("run {executor:?} executor"),
            (None, None) => "no executor declared".to_string(),
        };
        steps.push(("execute", target));
        steps.push(("record", "persist status, result and summary".to_string()));

        Self {
            steps: steps
                .into_iter()
                .enumerate()
                .map(|(i, (action, detail))| PlanStep {
                    order: i + 1,
                    action: action.to_string(),
                    detail,
                })
                .collect(),
            risk,
        }
    }
}
