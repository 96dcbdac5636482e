//! MCP request handler implementation.

use crate::error::ProtocolResult;
use crate::protocol::{
    CallToolParams, CallToolResult, Handler, InitializeParams, InitializeResult, ListToolsResult,
    MCP_VERSION, ServerCapabilities, ServerInfo,
};
use crate::server::state::AppState;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// MCP request handler backed by the tool registry and bridge.
pub struct McpHandler {
    state: Arc<AppState>,
}

impl McpHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

#[async_trait]
impl Handler for McpHandler {
    async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult> {
        if let Some(client) = params.client_info {
            info!(
                "Initialize request from {} v{}",
                client.name.as_deref().unwrap_or("unknown"),
                client.version.as_deref().unwrap_or("unknown")
            );
            self.state.set_client_info(client);
        } else {
            info!("Initialize request");
        }

        Ok(InitializeResult {
            protocol_version: MCP_VERSION.into(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: self.state.config.name.to_string(),
                version: self.state.config.version.to_string(),
            },
        })
    }

    async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
        let tools = self.state.tools.list().to_vec();
        debug!("Listing {} tools", tools.len());

        Ok(ListToolsResult { tools })
    }

    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult> {
        let seq = self.state.next_request_id();
        let client = self.state.client_info().and_then(|c| c.name);
        debug!(
            "Tool call #{} from {}: {}",
            seq,
            client.as_deref().unwrap_or("unknown client"),
            params.name
        );

        let value = self.state.bridge.call(&params.name, params.arguments).await?;
        Ok(CallToolResult::from_value(value))
    }
}
