//! Filter application: builds the exposed catalog once, then serves calls.
//!
//! Lifecycle:
//! ```text
//!   Config ──► RuleSet ──► upstream tools/list ──► filter + rename
//!                                                       │
//!                    health tool (optional) ◄───────────┘
//!                             │
//!                             ▼
//!                    frozen ExposedCatalog ──► list / call (concurrent)
//! ```
//! Nothing built here is mutated after [`FilterApplication::build`] returns,
//! so one instance is shared across request tasks behind an `Arc`.

use crate::tools::health::{health_input_schema, HEALTH_TOOL_DESCRIPTION};
use crate::tools::{
    estimate_tokens, filter_tools, ExposedCatalog, ExposedTool, HealthReporter, PublicTool,
    HEALTH_TOOL_NAME, HEALTH_UPSTREAM_NAME,
};
use crate::types::{Config, Error, Result};
use crate::upstream::{self, UpstreamGateway};
use crate::validation::validate_arguments;
use rmcp::model::CallToolResult;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Tool served by the filter itself instead of the upstream.
#[derive(Debug)]
enum LocalHandler {
    Health(HealthReporter),
}

impl LocalHandler {
    async fn invoke(&self, args: &Value) -> Result<CallToolResult> {
        match self {
            LocalHandler::Health(reporter) => reporter.handle(args).await,
        }
    }
}

/// The running filter: frozen catalog plus the upstream it forwards to.
pub struct FilterApplication {
    name: String,
    upstream: Arc<dyn UpstreamGateway>,
    catalog: ExposedCatalog,
    local_handlers: HashMap<String, LocalHandler>,
    token_estimate: usize,
}

impl std::fmt::Debug for FilterApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterApplication")
            .field("name", &self.name)
            .field("catalog", &self.catalog)
            .field("local_handlers", &self.local_handlers)
            .field("token_estimate", &self.token_estimate)
            .finish_non_exhaustive()
    }
}

impl FilterApplication {
    /// Connect to the configured upstream, then [`build`](Self::build).
    ///
    /// The upstream session stops when `cancel` fires.
    pub async fn connect(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let upstream = upstream::connect(&config.upstream, &config.name, cancel).await?;
        Self::build(config, Arc::new(upstream)).await
    }

    /// Build the exposed catalog from an already-connected upstream.
    ///
    /// Fails with the first build error; no partial catalog is ever served.
    pub async fn build(config: &Config, upstream: Arc<dyn UpstreamGateway>) -> Result<Self> {
        let rules = config.rule_set()?;

        let upstream_tools = upstream.list_tools().await.map_err(|err| match err {
            Error::UpstreamUnavailable(msg) => Error::UpstreamUnavailable(msg),
            other => Error::upstream_unavailable(other.to_string()),
        })?;
        tracing::info!(count = upstream_tools.len(), "fetched upstream tool catalog");

        let mut exposed = filter_tools(&upstream_tools, &rules)?;
        let token_estimate = if config.show_token_estimates {
            estimate_tokens(&exposed)
        } else {
            0
        };

        let mut local_handlers = HashMap::new();
        if config.include_health_tool {
            let health_name = rules.public_name(HEALTH_TOOL_NAME);
            if exposed.iter().any(|tool| tool.public_name == health_name) {
                return Err(Error::HealthNameCollision(health_name));
            }

            let reporter = HealthReporter::new(
                upstream.clone(),
                exposed.iter().map(|tool| tool.public_name.clone()).collect(),
                token_estimate,
            );
            exposed.push(ExposedTool {
                public_name: health_name.clone(),
                upstream_name: HEALTH_UPSTREAM_NAME.to_string(),
                description: HEALTH_TOOL_DESCRIPTION.to_string(),
                input_schema: health_input_schema(),
            });
            local_handlers.insert(health_name, LocalHandler::Health(reporter));
        }

        let catalog = ExposedCatalog::new(exposed);
        tracing::info!(
            server_name = %config.name,
            upstream_transport = config.upstream.transport_name(),
            allowed_tools = ?catalog.public_names(),
            "filter catalog ready"
        );
        if config.show_token_estimates {
            tracing::info!(token_estimate, "estimated tokens for exposed tool metadata");
        }

        Ok(Self {
            name: config.name.clone(),
            upstream,
            catalog,
            local_handlers,
            token_estimate,
        })
    }

    /// Server name advertised to clients.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &ExposedCatalog {
        &self.catalog
    }

    /// Token estimate computed at build time (0 when disabled).
    pub fn token_estimate(&self) -> usize {
        self.token_estimate
    }

    /// Public tool documents in publication order.
    pub fn list_public_tools(&self) -> Vec<PublicTool> {
        self.catalog.public_tools()
    }

    /// Serve one call by public name.
    ///
    /// Unknown names and invalid arguments are rejected without touching the
    /// upstream. Forwarded results come back verbatim.
    pub async fn call_tool(&self, public_name: &str, args: Value) -> Result<CallToolResult> {
        let Some(tool) = self.catalog.get(public_name) else {
            tracing::warn!(tool = public_name, "rejected call to unexposed tool");
            return Err(Error::ToolNotExposed(public_name.to_string()));
        };

        if let Err(err) = validate_arguments(&tool.input_schema, &args) {
            tracing::warn!(tool = public_name, error = %err, "rejected tool arguments");
            return Err(err);
        }

        if let Some(handler) = self.local_handlers.get(public_name) {
            tracing::debug!(tool = public_name, "handling tool call locally");
            return handler.invoke(&args).await;
        }

        tracing::debug!(
            tool = public_name,
            upstream_tool = %tool.upstream_name,
            "forwarding tool call"
        );
        self.upstream.call_tool(&tool.upstream_name, args).await
    }
}

// =============================================================================
// Tests
// =============================================================================
