//! MCP server handler backed by the tool dispatcher.
//!
//! The handshake, request framing and concurrency come from `rmcp`; this
//! module only translates between `rmcp` models and [`ToolDispatcher`].

use std::sync::Arc;

use revenuecat_mcp::{McpError, ToolDispatcher};
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
};
use serde_json::Value;

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "revenuecat-mcp";

/// Converts a dispatcher error into the JSON-RPC error `rmcp` sends.
fn error_data(error: McpError) -> ErrorData {
    let code = i32::try_from(error.code()).map_or(ErrorCode::INTERNAL_ERROR, ErrorCode);
    ErrorData::new(code, error.message, error.data)
}

/// Renders a tool result as MCP text content.
fn tool_content(result: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// MCP server bound to a tool dispatcher.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
    tools: Arc<[Tool]>,
}

impl McpServer {
    /// Creates a server for `dispatcher`, rendering its tool list once.
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        let tools = dispatcher
            .tools()
            .into_iter()
            .map(|descriptor| {
                let schema = match descriptor.input_schema {
                    Value::Object(schema) => schema,
                    _ => JsonObject::new(),
                };
                Tool::new(descriptor.name, descriptor.description, Arc::new(schema))
            })
            .collect();
        Self { dispatcher, tools }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Manage RevenueCat entitlements, offerings, products, packages and price \
                 experiments. Arguments are validated before any API call."
                    .to_owned(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools.to_vec()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        // Absent and null arguments both arrive as `None`; neither is an object.
        let args = request.arguments.map_or(Value::Null, Value::Object);

        match self.dispatcher.call(&request.name, &args).await {
            Ok(result) => Ok(tool_content(&result)),
            Err(error) => Err(error_data(error)),
        }
    }
}
