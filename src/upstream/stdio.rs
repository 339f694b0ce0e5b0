//! Stdio upstream: the MCP server runs as a child process and is spoken to
//! over its stdin/stdout.
//!
//! The child's stderr is inherited so upstream diagnostics reach the
//! operator's terminal. The child is killed when the session is dropped.

use super::McpUpstream;
use crate::types::{Error, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Spawn `command` and complete the MCP handshake over its stdio.
pub async fn spawn(
    command: &str,
    args: &[String],
    client_name: &str,
    cancel: CancellationToken,
) -> Result<McpUpstream> {
    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::upstream_unavailable(format!("failed to spawn '{}': {}", command, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::upstream_unavailable("child stdout was not captured"))?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::upstream_unavailable("child stdin was not captured"))?;

    tracing::debug!(pid = ?child.id(), "upstream process started");

    let upstream = McpUpstream::serve((stdout, stdin), client_name, cancel).await?;
    Ok(upstream.with_child(child))
}
