//! Request handler and method dispatcher.

use crate::error::{BridgeError, ProtocolError, ProtocolResult};
use crate::protocol::types::*;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Handler trait for processing MCP requests.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle initialize request.
    async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult>;

    /// List available tools.
    async fn list_tools(&self) -> ProtocolResult<ListToolsResult>;

    /// Call a tool.
    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult>;
}

/// Method dispatcher that routes requests to appropriate handlers.
///
/// Every entry point yields exactly one response that echoes the request id.
pub struct Dispatcher<H: Handler> {
    handler: Arc<H>,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Validate a decoded JSON body as a request envelope, then dispatch it.
    pub async fn dispatch_value(&self, value: Value) -> JsonRpcResponse {
        let id = RequestId::from_envelope(&value);

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                warn!("Malformed request envelope: {}", e);
                JsonRpcResponse::error(id, (&ProtocolError::InvalidRequest).into())
            }
        }
    }

    /// Dispatch a request to the appropriate handler method.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if !request.has_valid_version() {
            warn!("Unsupported jsonrpc version: {}", request.jsonrpc);
            return JsonRpcResponse::error(request.id, (&ProtocolError::InvalidRequest).into());
        }

        debug!("Dispatching request: {}", request.method);

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "tools/list" => self.handle_list_tools().await,
            "tools/call" => self.handle_call_tool(request.params).await,
            method => {
                warn!("Unknown method: {}", method);
                Err(ProtocolError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                error!("Request failed: {}", e);
                JsonRpcResponse::error(request.id, JsonRpcError::from(&e))
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> ProtocolResult<Value> {
        // Params are informational only; a missing or odd shape is not an error.
        let params = params
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            .unwrap_or_default();

        let result = self.handler.initialize(params).await?;
        serde_json::to_value(result).map_err(|e| ProtocolError::InternalError(e.to_string().into()))
    }

    async fn handle_list_tools(&self) -> ProtocolResult<Value> {
        let result = self.handler.list_tools().await?;
        serde_json::to_value(result).map_err(|e| ProtocolError::InternalError(e.to_string().into()))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> ProtocolResult<Value> {
        let params = parse_call_params(params)?;
        let result = self.handler.call_tool(params).await?;
        serde_json::to_value(result).map_err(|e| ProtocolError::InternalError(e.to_string().into()))
    }
}

fn parse_call_params(params: Option<Value>) -> ProtocolResult<CallToolParams> {
    let params = params.ok_or_else(|| ProtocolError::InvalidParams("Missing params".into()))?;

    let name = match params.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ProtocolError::InvalidParams("Missing tool name".into()));
        }
        Some(_) => return Err(ProtocolError::InvalidParams("Tool name must be a string".into())),
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(arguments) => arguments.clone(),
    };

    Ok(CallToolParams { name, arguments })
}

/// Map a failed request onto its wire error.
impl From<&ProtocolError> for JsonRpcError {
    fn from(error: &ProtocolError) -> Self {
        match error {
            ProtocolError::Bridge(BridgeError::ToolNotFound(name)) => {
                JsonRpcError::new(error.code(), format!("Tool not found: {}", name))
            }
            ProtocolError::Bridge(e) => JsonRpcError::tool_execution(e.to_string()),
            ProtocolError::ParseError => JsonRpcError::parse_error(),
            ProtocolError::InvalidRequest => JsonRpcError::invalid_request(),
            ProtocolError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            ProtocolError::InvalidParams(_) => JsonRpcError::invalid_params(error.to_string()),
            e => JsonRpcError::new(e.code(), e.to_string()),
        }
    }
}
