//! MCP server lifecycle: start the rmcp session, run it until the client
//! disconnects or shutdown is requested.
//!
//! Requests run concurrently inside the rmcp session. On shutdown, in-flight
//! tool calls are cancelled instead of awaited so a stalled upstream cannot
//! hold the process open.

use std::sync::Arc;

use rmcp::service::serve_server_with_ct;
use rmcp::transport::IntoTransport;
use rmcp::RoleServer;
use tokio_util::sync::CancellationToken;

use crate::app::FilterApplication;
use crate::mcp::handler::FilterServer;
use crate::types::{Error, Result};

/// MCP server wrapping the filter application.
#[derive(Debug)]
pub struct McpServer {
    app: Arc<FilterApplication>,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(app: Arc<FilterApplication>) -> Self {
        Self::with_cancellation(app, CancellationToken::new())
    }

    /// Server stopped by `cancel` (typically shared with the upstream).
    pub fn with_cancellation(app: Arc<FilterApplication>, cancel: CancellationToken) -> Self {
        Self { app, cancel }
    }

    /// Token that stops the server when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request shutdown. In-flight calls are abandoned.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(rmcp::transport::stdio()).await
    }

    /// Serve one client over `transport` until it disconnects or the server
    /// is shut down.
    pub async fn serve<T, E, A>(&self, transport: T) -> Result<()>
    where
        T: IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let handler = FilterServer::new(self.app.clone());

        let running = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!("MCP server shut down before the client initialized");
                return Ok(());
            }
            started = serve_server_with_ct(handler, transport, self.cancel.child_token()) => {
                started.map_err(|err| Error::transport(format!("MCP initialization failed: {}", err)))?
            }
        };
        tracing::info!(server_name = %self.app.name(), "MCP server ready");

        let reason = running
            .waiting()
            .await
            .map_err(|err| Error::transport(format!("MCP session task failed: {}", err)))?;
        tracing::info!(reason = ?reason, "MCP server stopped");
        Ok(())
    }
}
