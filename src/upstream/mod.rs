//! Upstream adapters: the single seam between the filter and the MCP
//! server it fronts.
//!
//! The MCP client session (handshake, request ids, pagination, server-side
//! pings) is run by `rmcp`. This module only picks the transport and maps
//! the session onto the two operations the filter needs.

pub mod http;
pub mod stdio;

use crate::tools::ToolDescriptor;
use crate::types::{Error, Result, UpstreamConfig};
use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
    ProtocolVersion, Tool,
};
use rmcp::service::{serve_client_with_ct, RunningService, ServiceError};
use rmcp::transport::IntoTransport;
use rmcp::{ClientHandler, RoleClient};
use serde_json::Value;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

/// Operations the filter needs from an upstream MCP server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamGateway: Send + Sync {
    /// Full upstream catalog, all pages, in upstream order.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke `name` upstream; the result is returned untouched.
    async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult>;
}

/// Client identity presented to the upstream during the handshake.
#[derive(Debug, Clone)]
pub struct FilterClient {
    name: String,
}

impl FilterClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ClientHandler for FilterClient {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::new(
            ClientCapabilities::default(),
            Implementation::new(self.name.clone(), env!("CARGO_PKG_VERSION").to_owned()),
        )
        .with_protocol_version(ProtocolVersion::default())
    }
}

/// A live MCP client session with the upstream.
pub struct McpUpstream {
    service: RunningService<RoleClient, FilterClient>,
    // Held so the child is killed when the session goes away.
    child: Option<Child>,
}

impl std::fmt::Debug for McpUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpUpstream")
            .field("child_pid", &self.child.as_ref().and_then(Child::id))
            .finish_non_exhaustive()
    }
}

impl McpUpstream {
    /// Run the MCP handshake over `transport`.
    ///
    /// Any duplex byte stream, `(reader, writer)` pair or rmcp client
    /// transport works; the session stops when `cancel` fires.
    pub async fn serve<T, E, A>(
        transport: T,
        client_name: &str,
        cancel: CancellationToken,
    ) -> Result<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = serve_client_with_ct(FilterClient::new(client_name), transport, cancel)
            .await
            .map_err(|err| Error::upstream_unavailable(format!("MCP handshake failed: {}", err)))?;

        if let Some(info) = service.peer_info() {
            let server_name = info.server_info.name.as_str();
            let server_version = info.server_info.version.as_str();
            tracing::debug!(
                server_name,
                server_version,
                protocol_version = ?info.protocol_version,
                "upstream handshake complete"
            );
        }

        Ok(Self {
            service,
            child: None,
        })
    }

    /// Tie a spawned child process to this session.
    pub fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }

    /// Close the session and wait for its task to finish.
    pub async fn close(self) {
        if let Err(err) = self.service.cancel().await {
            tracing::warn!(error = %err, "upstream session did not stop cleanly");
        }
    }
}

#[async_trait]
impl UpstreamGateway for McpUpstream {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let tools = self
            .service
            .peer()
            .list_all_tools()
            .await
            .map_err(|err| Error::upstream_unavailable(format!("tools/list failed: {}", err)))?;
        tools.into_iter().map(descriptor_from_tool).collect()
    }

    async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult> {
        let mut params = CallToolRequestParams::new(name.to_owned());
        params.arguments = args.as_object().cloned();
        self.service
            .peer()
            .call_tool(params)
            .await
            .map_err(|err| call_error(name, err))
    }
}

/// Connect to the configured upstream and complete the handshake.
pub async fn connect(
    config: &UpstreamConfig,
    client_name: &str,
    cancel: CancellationToken,
) -> Result<McpUpstream> {
    match config {
        UpstreamConfig::Stdio { command, args } => {
            tracing::info!(command = %command, args = ?args, "spawning stdio upstream");
            stdio::spawn(command, args, client_name, cancel).await
        }
        UpstreamConfig::Http { url, headers } => {
            tracing::info!(url = %url, "connecting to http upstream");
            http::connect(url, headers, client_name, cancel).await
        }
    }
}

/// Convert an upstream tool into the filter's descriptor.
///
/// A missing description becomes `""`. A tool without a name makes the
/// whole catalog unusable.
pub(crate) fn descriptor_from_tool(tool: Tool) -> Result<ToolDescriptor> {
    if tool.name.is_empty() {
        return Err(Error::upstream_unavailable(
            "upstream advertised a tool without a name",
        ));
    }
    let description = tool
        .description
        .as_deref()
        .unwrap_or_default()
        .to_owned();
    let input_schema = Value::Object((*tool.input_schema).clone());
    Ok(ToolDescriptor::new(tool.name, description, input_schema))
}

/// JSON-RPC error objects from the upstream pass through; anything else is
/// a transport failure.
fn call_error(name: &str, err: ServiceError) -> Error {
    match err {
        ServiceError::McpError(data) => Error::UpstreamRejected(data),
        other => Error::upstream_call_failed(format!("tools/call '{}' failed: {}", name, other)),
    }
}
