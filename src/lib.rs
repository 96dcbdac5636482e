//! MCP server for host application introspection.
//!
//! Serves JSON-RPC 2.0 over HTTP on `127.0.0.1` and forwards tool calls
//! (code evaluation, store queries, module and variable discovery, DOM
//! inspection) to an execution context supplied by the host. The context
//! either lives in-process ([`ExecutionContext`]) or in another process
//! exchanging line-delimited frames with [`bridge::carry`]; the
//! `devtools-mcp` binary carries frames over its own stdin and stdout.
//!
//! Anyone able to reach the loopback port can run arbitrary code in the host.
//! There is no authentication; binding to loopback is the only containment.
//!
//! # Example
//!
//! ```no_run
//! use devtools_mcp::{
//!     bridge::ExecutionContext,
//!     config::ServerConfig,
//!     protocol::McpServerBuilder,
//!     server::{AppStateBuilder, McpHandler},
//! };
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! struct Host;
//!
//! #[async_trait::async_trait]
//! impl ExecutionContext for Host {
//!     async fn invoke(&self, tool: &str, _args: Value) -> Result<Value, String> {
//!         Err(format!("{tool} is not wired up yet"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let state = Arc::new(
//!         AppStateBuilder::new()
//!             .config(config.clone())
//!             .build()
//!             .map_err(|e| anyhow::anyhow!(e))?,
//!     );
//!
//!     // The host attaches its execution context whenever it is ready.
//!     state.bridge.attach_context(Arc::new(Host));
//!
//!     let server = McpServerBuilder::new()
//!         .handler(McpHandler::new(state))
//!         .config(config)
//!         .build()?;
//!
//!     server.start_from_config().await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use bridge::{ExecutionContext, ToolBridge, ToolCallResult};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{BridgeError, LifecycleError, McpError, ProtocolError, Result};
pub use protocol::{McpServer, McpServerBuilder, ServerState};
pub use server::{AppState, AppStateBuilder, McpHandler};
pub use tools::ToolRegistry;
