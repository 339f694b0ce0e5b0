//! Health reporting for the filter.
//!
//! Health is computed strictly on demand: one upstream check per call, no
//! background polling. A failed check is reported as `upstream_ok: false`
//! and logged, never propagated.

use crate::tools::catalog::ExposedTool;
use crate::types::Result;
use crate::upstream::UpstreamGateway;
use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Name (before prefixing) of the synthetic health tool.
pub const HEALTH_TOOL_NAME: &str = "health";

/// Description published for the health tool.
pub const HEALTH_TOOL_DESCRIPTION: &str = "Report upstream availability and exposed tool summary.";

/// Input schema of the health tool (takes no arguments).
pub fn health_input_schema() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

// =============================================================================
// Token estimate
// =============================================================================

/// Rough token estimate for the metadata clients receive (~4 chars/token).
///
/// Each tool is rendered as compact JSON with sorted keys; the character
/// counts are summed and divided by four, rounding down.
pub fn estimate_tokens(tools: &[ExposedTool]) -> usize {
    let total_chars: usize = tools
        .iter()
        .map(|tool| {
            let document = json!({
                "name": tool.public_name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            });
            document.to_string().chars().count()
        })
        .sum();
    total_chars / 4
}

// =============================================================================
// Health report
// =============================================================================

/// Snapshot returned by the health tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub upstream_ok: bool,
    pub exposed_tools: Vec<String>,
    pub tool_count: usize,
    pub token_estimate: usize,
}

impl HealthReport {
    /// Pretty JSON with alphabetically sorted keys.
    pub fn to_json_text(&self) -> Result<String> {
        // Going through `Value` sorts the keys (BTreeMap-backed map).
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Render as a tool-call result: text content plus structured content.
    pub fn to_call_result(&self) -> Result<CallToolResult> {
        let mut result = CallToolResult::success(vec![Content::text(self.to_json_text()?)]);
        result.structured_content = Some(serde_json::to_value(self)?);
        Ok(result)
    }
}

// =============================================================================
// Reporter
// =============================================================================

/// Computes health snapshots for the exposed catalog.
pub struct HealthReporter {
    upstream: Arc<dyn UpstreamGateway>,
    exposed_tools: Vec<String>,
    token_estimate: usize,
}

impl std::fmt::Debug for HealthReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthReporter")
            .field("exposed_tools", &self.exposed_tools)
            .field("token_estimate", &self.token_estimate)
            .finish_non_exhaustive()
    }
}

impl HealthReporter {
    /// `exposed_tools` are the public names of the non-health tools; they are
    /// sorted here once.
    pub fn new(
        upstream: Arc<dyn UpstreamGateway>,
        mut exposed_tools: Vec<String>,
        token_estimate: usize,
    ) -> Self {
        exposed_tools.sort();
        Self {
            upstream,
            exposed_tools,
            token_estimate,
        }
    }

    /// Check the upstream and build a snapshot.
    pub async fn report(&self) -> HealthReport {
        let upstream_ok = match self.upstream.list_tools().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "upstream health check failed");
                false
            }
        };

        HealthReport {
            upstream_ok,
            exposed_tools: self.exposed_tools.clone(),
            tool_count: self.exposed_tools.len(),
            token_estimate: self.token_estimate,
        }
    }

    /// Local handler used by the filter: arguments are ignored.
    pub async fn handle(&self, _args: &Value) -> Result<CallToolResult> {
        self.report().await.to_call_result()
    }
}

// =============================================================================
// Tests
// =============================================================================
