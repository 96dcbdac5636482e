//! Error types for the MCP server.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.

use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the devtools MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: Cow<'static, str> },
}

/// JSON-RPC 2.0 and MCP protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Parse error")]
    ParseError,

    #[error("Invalid Request")]
    InvalidRequest,

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(Cow<'static, str>),

    #[error("Internal error: {0}")]
    InternalError(Cow<'static, str>),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl ProtocolError {
    /// Returns the JSON-RPC 2.0 error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::InternalError(_) => -32603,
            Self::Bridge(e) => e.code(),
        }
    }
}

/// Failures crossing the boundary to the execution context.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("No execution context available")]
    NoExecutionContext,

    #[error("Failed to marshal tool call: {0}")]
    Marshal(String),

    #[error("Execution context disconnected before replying")]
    Disconnected,

    #[error("Tool call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    ToolFailed(String),
}

impl BridgeError {
    /// Unknown tools share the method-not-found code; every other bridge
    /// failure is a server-defined error.
    pub fn code(&self) -> i32 {
        match self {
            Self::ToolNotFound(_) => -32601,
            _ => -32000,
        }
    }
}

/// Listener start/stop errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Address already in use: 127.0.0.1:{0}")]
    AddressInUse(u16),

    #[error("Failed to bind 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
    },
}

/// Result type alias for McpError.
pub type Result<T> = std::result::Result<T, McpError>;

/// Result type alias for ProtocolError.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Result type alias for BridgeError.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Result type alias for LifecycleError.
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;
