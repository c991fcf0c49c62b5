//! Alert and inventory search executors.

use crate::ports::ops_store::{AlertQuery, OpsStore};
use opsplane_domain::{ParamMap, ToolError, param_bool, param_i64, param_text};
use serde_json::{Value, json};

const DEFAULT_SEARCH_LIMIT: usize = 50;

fn search_limit(params: &ParamMap) -> usize {
    match param_i64(params, "limit") {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_SEARCH_LIMIT,
    }
}

/// `service_id`, `severity` and `firing` (default true) filter the alerts.
pub async fn search_alerts(ops: &dyn OpsStore, params: &ParamMap) -> Result<Value, ToolError> {
    let query = AlertQuery {
        service_id: param_text(params, "service_id"),
        severity: param_text(params, "severity"),
        firing_only: param_bool(params, "firing").unwrap_or(true),
        limit: search_limit(params),
    };
    let alerts = ops.search_alerts(&query).await?;
    Ok(json!({ "count": alerts.len(), "items": alerts }))
}

/// Matches `keyword` (or `q`) against service and host names.
pub async fn search_inventory(ops: &dyn OpsStore, params: &ParamMap) -> Result<Value, ToolError> {
    let keyword = param_text(params, "keyword").or_else(|| param_text(params, "q"));
    let env = param_text(params, "env");
    let items = ops
        .search_inventory(keyword.as_deref(), env.as_deref(), search_limit(params))
        .await?;
    Ok(json!({ "count": items.len(), "items": items }))
}
