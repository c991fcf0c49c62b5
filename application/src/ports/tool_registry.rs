//! Tool registry port
//!
//! Tools are typed: each implements [`Tool`] with its own `Input` struct.
//! The registry erases them behind [`ErasedTool`] so the execution engine can
//! look them up by name, while decoding into the typed input still happens
//! per tool (a decode failure is an `invalid_param`, never a panic).
//!
//! ```text
//! ToolRegistry
//!   ├─ "host_logs"      → TypedTool<HostLogsTool>      (HostLogsInput)
//!   ├─ "release_trigger"→ TypedTool<ReleaseTriggerTool>(ReleaseTriggerInput)
//!   └─ ...
//! ```

use crate::ports::permission::PermissionChecker;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use opsplane_domain::{ParamMap, ToolError, ToolMeta, ToolSpec};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A typed operational tool.
///
/// The body must observe `cancel` at its await points; the engine cancels it
/// when the deadline passes and stops waiting for the result.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Input: Serialize + DeserializeOwned + Send + 'static;

    fn meta(&self) -> ToolMeta;

    async fn call(&self, input: Self::Input, cancel: CancellationToken) -> Result<Value, ToolError>;
}

/// Future running one bound tool body.
pub type ToolFuture = BoxFuture<'static, Result<Value, ToolError>>;

/// Name-addressable view of a [`Tool`].
pub trait ErasedTool: Send + Sync {
    fn meta(&self) -> &ToolMeta;

    /// Decode `params` into the typed input and bind the body to it.
    fn bind(&self, params: &ParamMap, cancel: CancellationToken) -> Result<ToolFuture, ToolError>;
}

struct TypedTool<T: Tool> {
    meta: ToolMeta,
    tool: Arc<T>,
}

impl<T: Tool> ErasedTool for TypedTool<T> {
    fn meta(&self) -> &ToolMeta {
        &self.meta
    }

    fn bind(&self, params: &ParamMap, cancel: CancellationToken) -> Result<ToolFuture, ToolError> {
        let input: T::Input = serde_json::from_value(Value::Object(params.clone()))
            .map_err(|e| ToolError::InvalidParam(format!("{}: {}", self.meta.name, e)))?;
        let tool = Arc::clone(&self.tool);
        Ok(async move { tool.call(input, cancel).await }.boxed())
    }
}

/// Flatten a typed input into the generic parameter map.
pub fn to_params<I: Serialize>(input: &I) -> Result<ParamMap, ToolError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::InvalidParam(format!(
            "tool input must serialize to an object, got {}",
            other
        ))),
        Err(e) => Err(ToolError::InvalidParam(e.to_string())),
    }
}

/// Closed mapping from tool name to metadata and executor.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    spec: ToolSpec,
    tools: HashMap<String, Arc<dyn ErasedTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool (builder pattern). A later tool with the same name replaces the earlier one.
    pub fn register<T: Tool>(mut self, tool: T) -> Self {
        let meta = tool.meta();
        self.spec = self.spec.register(meta.clone());
        self.tools.insert(
            meta.name.clone(),
            Arc::new(TypedTool {
                meta,
                tool: Arc::new(tool),
            }),
        );
        self
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ErasedTool>> {
        self.tools.get(name).cloned()
    }

    pub fn meta(&self, name: &str) -> Option<&ToolMeta> {
        self.spec.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn available_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.spec.names().collect();
        names.sort_unstable();
        names
    }

    /// Every tool's metadata, sorted by name.
    pub fn metas(&self) -> Vec<&ToolMeta> {
        self.spec.all()
    }

    /// Capability listing: the tools `caller` holds the permission for.
    pub fn visible_to(&self, permissions: &dyn PermissionChecker, caller: &str) -> Vec<&ToolMeta> {
        self.metas()
            .into_iter()
            .filter(|meta| {
                permissions.is_admin(caller) || permissions.has_permission(caller, &meta.permission)
            })
            .collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.available_tools())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsplane_domain::{RiskLevel, ToolMode};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct EchoInput {
        message: String,
        #[serde(default)]
        times: u32,
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        type Input = EchoInput;

        fn meta(&self) -> ToolMeta {
            ToolMeta::new("echo", "Echo", ToolMode::Readonly, RiskLevel::Low, "debug:read")
                .with_field("message", "string", "Text", true)
        }

        async fn call(&self, input: EchoInput, _cancel: CancellationToken) -> Result<Value, ToolError> {
            Ok(Value::from(input.message.repeat(input.times.max(1) as usize)))
        }
    }

    #[tokio::test]
    async fn test_bind_and_run() {
        let registry = ToolRegistry::new().register(EchoTool);
        let tool = registry.get("echo").unwrap();
        let params = to_params(&EchoInput {
            message: "ab".into(),
            times: 2,
        })
        .unwrap();

        let out = tool.bind(&params, CancellationToken::new()).unwrap().await;
        assert_eq!(out.unwrap(), Value::from("abab"));
    }

    #[test]
    fn test_bind_rejects_undecodable_params() {
        let registry = ToolRegistry::new().register(EchoTool);
        let tool = registry.get("echo").unwrap();
        let mut params = ParamMap::new();
        params.insert("message".into(), Value::from(12));

        let err = tool.bind(&params, CancellationToken::new()).err().unwrap();
        assert!(matches!(err, ToolError::InvalidParam(_)));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ToolRegistry::new().register(EchoTool);
        assert!(registry.has_tool("echo"));
        assert!(!registry.has_tool("nope"));
        assert_eq!(registry.available_tools(), vec!["echo"]);
        assert_eq!(registry.meta("echo").unwrap().permission, "debug:read");
    }

    #[test]
    fn test_to_params_requires_object() {
        assert!(to_params(&42).is_err());
        assert!(to_params(&serde_json::json!({"a": 1})).is_ok());
    }

    #[test]
    fn test_visible_to_filters_by_permission() {
        use crate::testing::GrantTable;

        let registry = ToolRegistry::new()
            .register(EchoTool)
            .register(crate::testing::EchoTool::new(crate::testing::release_meta()));
        let grants = GrantTable::new()
            .grant("bob", &["debug:read"])
            .admin("root");

        let names = |caller: &str| -> Vec<String> {
            registry
                .visible_to(&grants, caller)
                .into_iter()
                .map(|m| m.name.clone())
                .collect()
        };
        assert_eq!(names("bob"), vec!["echo"]);
        assert_eq!(names("root"), vec!["echo", "release_trigger"]);
        assert!(names("nobody").is_empty());
    }
}
