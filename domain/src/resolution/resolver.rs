//! Layered parameter resolver and its trace.

use crate::tool::{ParamMap, ToolMeta, is_empty_value};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys a conversation may pin for every tool call it makes.
pub const RUNTIME_HINT_KEYS: [&str; 7] = [
    "target",
    "host_id",
    "cluster_id",
    "namespace",
    "service_id",
    "env",
    "runtime_type",
];

/// Last-resort values that keep a diagnostic call bounded and local.
pub fn safety_defaults() -> [(&'static str, Value); 5] {
    [
        ("target", Value::from("localhost")),
        ("namespace", Value::from("default")),
        ("limit", Value::from(50)),
        ("tail_lines", Value::from(200)),
        ("lines", Value::from(200)),
    ]
}

/// Where a filled value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    Runtime,
    Memory,
    MetaDefault,
    SafetyDefault,
}

impl ParamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSource::Runtime => "runtime",
            ParamSource::Memory => "memory",
            ParamSource::MetaDefault => "meta_default",
            ParamSource::SafetyDefault => "safety_default",
        }
    }
}

/// External inputs to one resolution, gathered from the request context.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSources {
    /// Conversation-scoped hints; only [`RUNTIME_HINT_KEYS`] are consulted
    pub runtime_hints: ParamMap,
    /// Parameters last used successfully for this tool in this conversation
    pub memory: Option<ParamMap>,
}

impl ResolutionSources {
    pub fn new(runtime_hints: ParamMap, memory: Option<ParamMap>) -> Self {
        Self {
            runtime_hints,
            memory,
        }
    }

    fn runtime_hint(&self, key: &str) -> Option<&Value> {
        if !RUNTIME_HINT_KEYS.contains(&key) {
            return None;
        }
        self.runtime_hints
            .get(key)
            .filter(|v| !is_empty_value(Some(v)))
    }

    fn memory_value(&self, key: &str) -> Option<&Value> {
        self.memory
            .as_ref()
            .and_then(|m| m.get(key))
            .filter(|v| !is_empty_value(Some(v)))
    }
}

/// Record of one resolution: what came in, what was filled and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTrace {
    pub input: ParamMap,
    pub filled: ParamMap,
    pub sources: BTreeMap<String, ParamSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_field: Option<String>,
    pub resolved: ParamMap,
}

impl ResolutionTrace {
    pub fn filled_anything(&self) -> bool {
        !self.filled.is_empty()
    }

    pub fn source_of(&self, key: &str) -> Option<ParamSource> {
        self.sources.get(key).copied()
    }
}

/// Stateless resolver; all state arrives through [`ResolutionSources`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterResolver;

impl ParameterResolver {
    /// Fill empty keys of `params` for `meta`.
    ///
    /// Candidate keys are the tool's schema fields, required fields and
    /// default-hint keys, plus `missing_field` when a retry names one.
    pub fn resolve(
        &self,
        sources: &ResolutionSources,
        meta: &ToolMeta,
        params: &ParamMap,
        missing_field: Option<&str>,
    ) -> ResolutionTrace {
        let mut resolved = params.clone();
        let mut filled = ParamMap::new();
        let mut origin = BTreeMap::new();

        for key in candidate_keys(meta, missing_field) {
            if !is_empty_value(resolved.get(&key)) {
                continue;
            }
            if let Some((value, source)) = lookup(sources, meta, &key) {
                resolved.insert(key.clone(), value.clone());
                filled.insert(key.clone(), value);
                origin.insert(key, source);
            }
        }

        ResolutionTrace {
            input: params.clone(),
            filled,
            sources: origin,
            missing_field: missing_field.map(str::to_string),
            resolved,
        }
    }
}

fn candidate_keys(meta: &ToolMeta, missing_field: Option<&str>) -> Vec<String> {
    let mut keys: Vec<String> = meta.schema_fields().into_iter().map(String::from).collect();
    keys.extend(meta.required.iter().cloned());
    keys.extend(meta.default_hints.keys().cloned());
    if let Some(field) = missing_field {
        keys.push(field.to_string());
    }
    keys.sort();
    keys.dedup();
    keys
}

fn lookup(sources: &ResolutionSources, meta: &ToolMeta, key: &str) -> Option<(Value, ParamSource)> {
    if let Some(v) = sources.runtime_hint(key) {
        return Some((v.clone(), ParamSource::Runtime));
    }
    if let Some(v) = sources.memory_value(key) {
        return Some((v.clone(), ParamSource::Memory));
    }
    if let Some(v) = meta
        .default_hints
        .get(key)
        .filter(|v| !is_empty_value(Some(v)))
    {
        return Some((v.clone(), ParamSource::MetaDefault));
    }
    safety_defaults()
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| (v, ParamSource::SafetyDefault))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{RiskLevel, ToolMode};
    use serde_json::json;

    fn meta() -> ToolMeta {
        ToolMeta::new(
            "cluster_pods",
            "List pods",
            ToolMode::Readonly,
            RiskLevel::Low,
            "cluster:read",
        )
        .with_field("cluster_id", "string", "Cluster", true)
        .with_field("namespace", "string", "Namespace", false)
        .with_field("limit", "integer", "Max rows", false)
        .with_default_hint("namespace", "kube-system")
    }

    fn map(value: Value) -> ParamMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_runtime_beats_memory_beats_default() {
        let sources = ResolutionSources::new(
            map(json!({"namespace": "from-runtime"})),
            Some(map(json!({"namespace": "from-memory"}))),
        );
        let trace = ParameterResolver.resolve(&sources, &meta(), &ParamMap::new(), None);

        assert_eq!(trace.resolved["namespace"], "from-runtime");
        assert_eq!(trace.source_of("namespace"), Some(ParamSource::Runtime));
    }

    #[test]
    fn test_memory_beats_default() {
        let sources = ResolutionSources::new(
            ParamMap::new(),
            Some(map(json!({"namespace": "from-memory"}))),
        );
        let trace = ParameterResolver.resolve(&sources, &meta(), &ParamMap::new(), None);

        assert_eq!(trace.resolved["namespace"], "from-memory");
        assert_eq!(trace.source_of("namespace"), Some(ParamSource::Memory));
    }

    #[test]
    fn test_meta_default_beats_safety_default() {
        let trace = ParameterResolver.resolve(
            &ResolutionSources::default(),
            &meta(),
            &ParamMap::new(),
            None,
        );

        assert_eq!(trace.resolved["namespace"], "kube-system");
        assert_eq!(trace.resolved["limit"], 50);
        assert_eq!(trace.source_of("limit"), Some(ParamSource::SafetyDefault));
        // No source knows the cluster
        assert!(!trace.resolved.contains_key("cluster_id"));
    }

    #[test]
    fn test_caller_value_never_overwritten() {
        let sources = ResolutionSources::new(
            map(json!({"namespace": "runtime", "cluster_id": "c-runtime"})),
            Some(map(json!({"namespace": "memory", "cluster_id": "c-memory"}))),
        );
        let input = map(json!({"namespace": "payments", "cluster_id": "c-1", "limit": 5}));
        let trace = ParameterResolver.resolve(&sources, &meta(), &input, None);

        assert_eq!(trace.resolved, input);
        assert!(!trace.filled_anything());
    }

    #[test]
    fn test_blank_caller_value_is_filled() {
        let sources = ResolutionSources::new(map(json!({"cluster_id": "c-9"})), None);
        let input = map(json!({"cluster_id": "   "}));
        let trace = ParameterResolver.resolve(&sources, &meta(), &input, None);

        assert_eq!(trace.resolved["cluster_id"], "c-9");
        assert_eq!(trace.filled["cluster_id"], "c-9");
        assert_eq!(trace.input["cluster_id"], "   ");
    }

    #[test]
    fn test_runtime_hints_limited_to_known_keys() {
        let sources = ResolutionSources::new(map(json!({"limit": 7})), None);
        let trace = ParameterResolver.resolve(&sources, &meta(), &ParamMap::new(), None);

        // "limit" is not a runtime hint key, so the safety default wins
        assert_eq!(trace.resolved["limit"], 50);
    }

    #[test]
    fn test_missing_field_marker_widens_candidates() {
        let sources = ResolutionSources::new(map(json!({"host_id": "h-3"})), None);
        let trace = ParameterResolver.resolve(&sources, &meta(), &ParamMap::new(), Some("host_id"));

        assert_eq!(trace.missing_field.as_deref(), Some("host_id"));
        assert_eq!(trace.resolved["host_id"], "h-3");
    }
}
