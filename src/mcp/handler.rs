//! rmcp server handler backed by the filter application.

use crate::app::FilterApplication;
use crate::tools::PublicTool;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, InitializeRequestParams,
    InitializeResult, ListToolsResult, PaginatedRequestParams, ProtocolVersion,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Protocol revisions the filter speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[ProtocolVersion] = &[
    ProtocolVersion::V_2025_06_18,
    ProtocolVersion::V_2025_03_26,
    ProtocolVersion::V_2024_11_05,
];

/// Pick the protocol revision for a session.
///
/// A supported client revision is accepted as is; anything else is answered
/// with the newest supported revision and left to the client to accept or
/// disconnect.
pub fn negotiate_protocol_version(requested: &ProtocolVersion) -> ProtocolVersion {
    if SUPPORTED_PROTOCOL_VERSIONS.contains(requested) {
        requested.clone()
    } else {
        SUPPORTED_PROTOCOL_VERSIONS[0].clone()
    }
}

/// Serves `tools/list` and `tools/call` from the frozen catalog.
#[derive(Debug, Clone)]
pub struct FilterServer {
    app: Arc<FilterApplication>,
}

impl FilterServer {
    pub fn new(app: Arc<FilterApplication>) -> Self {
        Self { app }
    }
}

impl ServerHandler for FilterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(SUPPORTED_PROTOCOL_VERSIONS[0].clone())
            .with_server_info(Implementation::new(
                self.app.name().to_owned(),
                env!("CARGO_PKG_VERSION").to_owned(),
            ))
    }

    async fn initialize(
        &self,
        request: InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, ErrorData> {
        let mut info = self.get_info();
        info.protocol_version = negotiate_protocol_version(&request.protocol_version);
        tracing::info!(
            client = %request.client_info.name,
            requested = ?request.protocol_version,
            negotiated = ?info.protocol_version,
            "client initialized"
        );
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .app
            .list_public_tools()
            .into_iter()
            .map(to_rmcp_tool)
            .collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = Value::Object(request.arguments.unwrap_or_default());

        tokio::select! {
            _ = context.ct.cancelled() => {
                tracing::info!(tool = %request.name, "tool call cancelled");
                Err(ErrorData::internal_error("request cancelled", None))
            }
            outcome = self.app.call_tool(&request.name, args) => {
                outcome.map_err(|err| {
                    tracing::debug!(tool = %request.name, error = %err, "tool call failed");
                    ErrorData::from(err)
                })
            }
        }
    }
}

/// Publish a catalog entry as an rmcp tool. Non-object schemas are
/// published as `{}`.
fn to_rmcp_tool(tool: PublicTool) -> Tool {
    let schema = match tool.input_schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Tool::new(tool.name, tool.description, Arc::new(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn version(raw: &str) -> ProtocolVersion {
        serde_json::from_value(json!(raw)).unwrap()
    }

    #[test]
    fn test_supported_version_is_echoed() {
        assert_eq!(
            negotiate_protocol_version(&version("2024-11-05")),
            ProtocolVersion::V_2024_11_05
        );
        assert_eq!(
            negotiate_protocol_version(&version("2025-03-26")),
            ProtocolVersion::V_2025_03_26
        );
    }

    #[test]
    fn test_unknown_version_gets_newest_supported() {
        assert_eq!(
            negotiate_protocol_version(&version("1999-01-01")),
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
        assert_eq!(
            negotiate_protocol_version(&version("2099-12-31")),
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
    }

    #[test]
    fn test_tool_conversion_keeps_schema() {
        let tool = to_rmcp_tool(PublicTool::new(
            "p_execute_sql",
            "Run SQL",
            json!({"type": "object", "required": ["sql"]}),
        ));
        assert_eq!(tool.name, "p_execute_sql");
        assert_eq!(tool.description.as_deref(), Some("Run SQL"));
        assert_eq!(tool.input_schema.get("required"), Some(&json!(["sql"])));
    }

    #[test]
    fn test_non_object_schema_published_empty() {
        let tool = to_rmcp_tool(PublicTool::new("x", "", json!(true)));
        assert!(tool.input_schema.is_empty());
    }
}
