//! MCP protocol implementation over JSON-RPC 2.0 and HTTP.

pub mod handler;
pub mod server;
pub mod transport;
pub mod types;

pub use handler::{Dispatcher, Handler};
pub use server::{McpServer, McpServerBuilder, ServerState};
pub use transport::{HealthInfo, router};
pub use types::*;
