//! MCP server binary entry point.

use anyhow::Result;
use devtools_mcp::{
    bridge::carry,
    config::ServerConfigBuilder,
    protocol::McpServerBuilder,
    server::{AppStateBuilder, McpHandler},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = ServerConfigBuilder::new().from_env()?.build()?;

    let state = Arc::new(
        AppStateBuilder::new()
            .config(config.clone())
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    );

    info!("Server state initialized with {} tools", state.tools.len());

    // Logs go to stderr, leaving stdio to the execution context's frames.
    let channel = state.bridge.attach();
    let carrier = tokio::spawn(async move {
        match carry(channel, tokio::io::stdin(), tokio::io::stdout()).await {
            Ok(()) => warn!("Execution context disconnected; tool calls will fail"),
            Err(e) => error!("Bridge carrier failed: {}", e),
        }
    });

    let server = McpServerBuilder::new()
        .handler(McpHandler::new(state))
        .config(config)
        .build()?;

    match server.start_from_config().await? {
        Some(addr) => info!("MCP server ready on http://{}", addr),
        None => {
            info!("Server disabled (DEVTOOLS_MCP_ENABLED=false), exiting");
            return Ok(());
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.stop().await?;
    carrier.abort();

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("devtools_mcp=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
