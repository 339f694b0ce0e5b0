//! Client-facing MCP server.
//!
//! The protocol session itself (framing, handshake, ping, cancellation
//! notifications) is run by `rmcp`; [`FilterServer`] answers the tool
//! requests from the frozen catalog.

pub mod handler;
pub mod server;

pub use handler::{negotiate_protocol_version, FilterServer, SUPPORTED_PROTOCOL_VERSIONS};
pub use server::McpServer;
