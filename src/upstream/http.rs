//! Streamable-HTTP upstream.
//!
//! Session ids, SSE replies and request correlation are handled by rmcp's
//! streamable-HTTP client transport; this module only prepares the reqwest
//! client that carries the configured headers.

use super::McpUpstream;
use crate::types::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Connect to `url` and complete the MCP handshake.
///
/// `headers` are sent with every request (typically authorization).
pub async fn connect(
    url: &str,
    headers: &BTreeMap<String, String>,
    client_name: &str,
    cancel: CancellationToken,
) -> Result<McpUpstream> {
    let client = reqwest::Client::builder()
        .default_headers(build_headers(headers)?)
        .build()
        .map_err(|e| Error::config(format!("cannot build HTTP client: {}", e)))?;

    let transport = StreamableHttpClientTransport::with_client(
        client,
        StreamableHttpClientTransportConfig::with_uri(url.to_owned()),
    );
    McpUpstream::serve(transport, client_name, cancel).await
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::config(format!("invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("invalid value for header '{}': {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
