//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use mcp_filter::tools::ToolDescriptor;
use mcp_filter::types::{Config, Error, Result, RuleConfig};
use mcp_filter::upstream::UpstreamGateway;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, Implementation,
    InitializeRequestParams, InitializeResult, ListToolsResult, PaginatedRequestParams,
    ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The three tools every fake upstream advertises.
pub fn sample_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "execute_sql",
            "Execute a SQL query and return the results.",
            json!({
                "type": "object",
                "properties": {"sql": {"type": "string", "description": "SQL query"}},
                "required": ["sql"],
            }),
        ),
        ToolDescriptor::new(
            "create_project",
            "Create a new project.",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Project name"},
                    "region": {"type": "string", "description": "Cloud region"},
                },
                "required": ["name", "region"],
            }),
        ),
        ToolDescriptor::new(
            "delete_branch",
            "Delete a git branch.",
            json!({
                "type": "object",
                "properties": {"branch": {"type": "string", "description": "Branch to delete"}},
                "required": ["branch"],
            }),
        ),
    ]
}

/// Tool name the fakes answer with a JSON-RPC error instead of a result.
pub const REJECTING_TOOL: &str = "rate_limited";

/// Error object returned for [`REJECTING_TOOL`].
pub fn rejection() -> ErrorData {
    ErrorData::new(
        ErrorCode(-32029),
        "rate limited",
        Some(json!({"retry_after": 30})),
    )
}

/// Canned reply for a successful call of one of the sample tools.
fn reply(name: &str, args: &Value) -> CallToolResult {
    let text = match name {
        "execute_sql" => format!("Query executed: {}", args["sql"].as_str().unwrap_or("")),
        "create_project" => format!("Project created: {}", args["name"].as_str().unwrap_or("")),
        "delete_branch" => format!("Branch deleted: {}", args["branch"].as_str().unwrap_or("")),
        other => {
            return CallToolResult::error(vec![Content::text(format!("Unknown tool: {}", other))])
        }
    };
    CallToolResult::success(vec![Content::text(text)])
}

/// Serialized form of a call result, for indexing like the wire shape.
pub fn as_json(result: &CallToolResult) -> Value {
    serde_json::to_value(result).unwrap()
}

/// In-process upstream that records tool calls.
#[derive(Debug)]
pub struct FakeUpstream {
    tools: Vec<ToolDescriptor>,
    pub calls: Mutex<Vec<(String, Value)>>,
    pub list_count: AtomicUsize,
    pub reachable: AtomicBool,
    pub call_delay: Option<Duration>,
}

impl Default for FakeUpstream {
    fn default() -> Self {
        Self::with_tools(sample_tools())
    }
}

impl FakeUpstream {
    pub fn with_tools(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            calls: Mutex::new(Vec::new()),
            list_count: AtomicUsize::new(0),
            reachable: AtomicBool::new(true),
            call_delay: None,
        }
    }

    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamGateway for FakeUpstream {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(Error::upstream_unavailable("connection refused"));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult> {
        self.calls.lock().unwrap().push((name.to_string(), args.clone()));
        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }
        if name == REJECTING_TOOL {
            return Err(Error::UpstreamRejected(rejection()));
        }
        Ok(reply(name, &args))
    }
}

/// A real MCP server for exercising the rmcp-backed upstream adapters.
///
/// Tools are served in `pages`, one page per `tools/list` request, with the
/// page index as cursor.
#[derive(Debug, Clone)]
pub struct ScriptedServer {
    pub pages: Arc<Vec<Vec<Tool>>>,
    pub calls: Arc<Mutex<Vec<(String, Value)>>>,
    pub list_requests: Arc<AtomicUsize>,
    pub client_name: Arc<Mutex<Option<String>>>,
}

impl Default for ScriptedServer {
    fn default() -> Self {
        Self::with_pages(vec![sample_tools().into_iter().map(to_tool).collect()])
    }
}

impl ScriptedServer {
    pub fn with_pages(pages: Vec<Vec<Tool>>) -> Self {
        Self {
            pages: Arc::new(pages),
            calls: Arc::default(),
            list_requests: Arc::default(),
            client_name: Arc::default(),
        }
    }

    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServerHandler for ScriptedServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2025_03_26)
            .with_server_info(Implementation::new("scripted-upstream", "1.0.0"))
    }

    async fn initialize(
        &self,
        request: InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, ErrorData> {
        *self.client_name.lock().unwrap() = Some(request.client_info.name.clone());
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        self.list_requests.fetch_add(1, Ordering::SeqCst);
        let page = request
            .and_then(|r| r.cursor)
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        let next = page + 1;
        Ok(ListToolsResult {
            tools: self.pages.get(page).cloned().unwrap_or_default(),
            next_cursor: (next < self.pages.len()).then(|| next.to_string()),
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let args = Value::Object(request.arguments.unwrap_or_default());
        self.calls
            .lock()
            .unwrap()
            .push((request.name.to_string(), args.clone()));
        if request.name == REJECTING_TOOL {
            return Err(rejection());
        }
        Ok(reply(&request.name, &args))
    }
}

/// rmcp form of a descriptor.
pub fn to_tool(descriptor: ToolDescriptor) -> Tool {
    let schema = match descriptor.input_schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Tool::new(descriptor.name, descriptor.description, Arc::new(schema))
}

/// Config with the given rules and health flag; transport is irrelevant
/// because tests hand the upstream in directly.
pub fn config_with(rules: RuleConfig, include_health_tool: bool) -> Config {
    Config {
        name: "filter-test".to_string(),
        include_health_tool,
        rules,
        ..Config::default()
    }
}
