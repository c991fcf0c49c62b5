//! Tool domain entities

use super::params::ParamMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Whether a tool only observes state or changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Diagnostic, side-effect free (e.g. `host_logs`, `service_status`)
    Readonly,
    /// Changes operational state; gated behind an approval ticket
    Mutating,
}

impl ToolMode {
    pub fn as_str(&self) -> &str {
        match self {
            ToolMode::Readonly => "readonly",
            ToolMode::Mutating => "mutating",
        }
    }

    pub fn requires_approval(&self) -> bool {
        matches!(self, ToolMode::Mutating)
    }
}

impl std::fmt::Display for ToolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk level of a tool operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static metadata describing a registered tool.
///
/// Immutable once registered: the registry hands out shared references and
/// never exposes a mutable accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMeta {
    /// Unique name of the tool (e.g., "host_logs")
    pub name: String,
    /// Human-readable description
    pub description: String,
    pub mode: ToolMode,
    pub risk: RiskLevel,
    /// Permission code the caller must hold (e.g., "host:read")
    pub permission: String,
    /// JSON schema of the tool input
    pub input_schema: serde_json::Value,
    /// Fields the tool body cannot run without
    pub required: Vec<String>,
    /// Per-tool fallback values consulted by the parameter resolver
    pub default_hints: BTreeMap<String, serde_json::Value>,
}

impl ToolMeta {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        mode: ToolMode,
        risk: RiskLevel,
        permission: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mode,
            risk,
            permission: permission.into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            required: Vec::new(),
            default_hints: BTreeMap::new(),
        }
    }

    /// Declare an input property; `required` also records it in the required list.
    pub fn with_field(
        mut self,
        name: &str,
        json_type: &str,
        description: &str,
        required: bool,
    ) -> Self {
        if let Some(props) = self
            .input_schema
            .get_mut("properties")
            .and_then(|p| p.as_object_mut())
        {
            props.insert(
                name.to_string(),
                serde_json::json!({ "type": json_type, "description": description }),
            );
        }
        if required {
            self.required.push(name.to_string());
            if let Some(obj) = self.input_schema.as_object_mut() {
                obj.insert(
                    "required".to_string(),
                    serde_json::Value::from(self.required.clone()),
                );
            }
        }
        self
    }

    pub fn with_default_hint(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.default_hints.insert(key.to_string(), value.into());
        self
    }

    /// Property names declared in the input schema.
    pub fn schema_fields(&self) -> Vec<&str> {
        self.input_schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().map(|k| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Whether `key` is declared in the schema or the required list.
    pub fn accepts(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key) || self.schema_fields().contains(&key)
    }

    pub fn is_mutating(&self) -> bool {
        self.mode.requires_approval()
    }
}

/// Specification of registered tool metadata, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolMeta>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(mut self, tool: ToolMeta) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolMeta> {
        self.tools.get(name)
    }

    /// All metadata sorted by tool name, so listings are stable.
    pub fn all(&self) -> Vec<&ToolMeta> {
        let mut metas: Vec<&ToolMeta> = self.tools.values().collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        metas
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn mutating_tools(&self) -> impl Iterator<Item = &ToolMeta> {
        self.tools.values().filter(|t| t.is_mutating())
    }

    pub fn readonly_tools(&self) -> impl Iterator<Item = &ToolMeta> {
        self.tools.values().filter(|t| !t.is_mutating())
    }
}

/// A call to a tool by name with generic arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    pub arguments: ParamMap,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: ParamMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}
