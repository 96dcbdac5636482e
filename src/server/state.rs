//! Shared application state.

use crate::bridge::ToolBridge;
use crate::config::ServerConfig;
use crate::protocol::ClientInfo;
use crate::tools::ToolRegistry;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct AppState {
    pub config: ServerConfig,
    pub tools: Arc<ToolRegistry>,
    pub bridge: Arc<ToolBridge>,
    client_info: RwLock<Option<ClientInfo>>,
    request_count: AtomicU64,
}

impl AppState {
    pub fn new(config: ServerConfig, tools: Arc<ToolRegistry>, bridge: Arc<ToolBridge>) -> Self {
        Self {
            config,
            tools,
            bridge,
            client_info: RwLock::new(None),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn set_client_info(&self, client_info: ClientInfo) {
        *self.client_info.write() = Some(client_info);
    }

    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client_info.read().clone()
    }

    pub fn next_request_id(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }
}

pub struct AppStateBuilder {
    config: Option<ServerConfig>,
    tools: Option<Arc<ToolRegistry>>,
    bridge: Option<Arc<ToolBridge>>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            tools: None,
            bridge: None,
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Use an existing bridge. Its registry replaces any set with [`tools`](Self::tools).
    pub fn bridge(mut self, bridge: Arc<ToolBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn build(self) -> Result<AppState, &'static str> {
        let config = self.config.ok_or("Config is required")?;

        let (tools, bridge) = match self.bridge {
            Some(bridge) => (Arc::clone(bridge.registry()), bridge),
            None => {
                let tools = self
                    .tools
                    .unwrap_or_else(|| Arc::new(crate::tools::create_registry()));
                let bridge = Arc::new(ToolBridge::new(Arc::clone(&tools), config.tool_timeout));
                (tools, bridge)
            }
        };

        Ok(AppState::new(config, tools, bridge))
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
