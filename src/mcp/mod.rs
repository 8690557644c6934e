//! MCP server adapter.
//!
//! ChoreoServer wraps a `Dispatcher` and answers `tools/list` and
//! `tools/call` over the stdio transport.
//!
//! Failure mapping:
//!   unknown tool / bad arguments -> protocol error (invalid_params)
//!   remote / transport / decode  -> tool result with isError = true
//!
use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, transport::stdio};
use serde_json::{Map, Value};

use crate::tools::{Dispatcher, ToolSpec};

#[derive(Debug, Clone)]
pub struct ChoreoServer {
    dispatcher: Dispatcher,
}

impl ChoreoServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// MCP tool descriptors for every registered tool.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher.registry().iter().map(to_tool).collect()
    }

    /// Run one call and map the outcome onto MCP results.
    pub async fn handle_call(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        match self.dispatcher.invoke(name, arguments).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) if e.is_caller_error() => {
                tracing::debug!(tool = name, error = %e, "rejected tool call");
                Err(McpError::invalid_params(e.to_string(), None))
            }
            Err(e) => {
                tracing::warn!(tool = name, status = ?e.status(), error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    fn instructions(&self) -> String {
        let settings = self.dispatcher.settings();
        let mut text = String::from(
            "Read-only access to the Choreo management API. Tools: get_organizations, \
             get_projects (orgId), get_components (orgHandle, projectId), \
             get_environments (orgId). Results are JSON arrays.",
        );
        match settings.organization() {
            Some(org) => text.push_str(&format!(
                " Default organization: {} (handle '{}', id {}); orgId/orgHandle and token may be omitted.",
                org.name, org.handle, org.id
            )),
            None => text.push_str(" Every call must pass a bearer token in 'token'."),
        }
        text
    }
}

/// Convert a registry declaration into an MCP tool descriptor.
pub fn to_tool(spec: &ToolSpec) -> Tool {
    Tool::new(
        spec.name.as_str(),
        spec.name.description(),
        Arc::new(spec.input_schema()),
    )
}

impl ServerHandler for ChoreoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_call(&request.name, request.arguments.as_ref())
            .await
    }
}

/// Serve over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(server: ChoreoServer) -> Result<()> {
    tracing::info!(tools = server.tools().len(), "starting MCP server on stdio");
    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP serve error: {:?}", e))
        .context("Failed to start MCP stdio service")?;
    service
        .waiting()
        .await
        .context("MCP service terminated abnormally")?;
    tracing::info!("MCP client disconnected");
    Ok(())
}
