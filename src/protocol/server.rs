//! MCP server with lifecycle management.

use crate::config::ServerConfig;
use crate::error::{LifecycleError, LifecycleResult, McpError, Result};
use crate::protocol::handler::{Dispatcher, Handler};
use crate::protocol::transport::{self, HealthInfo};
use crate::protocol::types::ServerInfo;
use parking_lot::RwLock;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// How long `stop` waits for in-flight connections before abandoning them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Server state enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Never started.
    Uninitialized,
    /// Listener bound and accepting connections.
    Listening,
    /// Listener closed; may be started again.
    Stopped,
}

struct RunningListener {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

/// Snapshot readable without waiting on a transition in progress.
#[derive(Debug, Clone, Copy)]
struct Status {
    state: ServerState,
    addr: Option<SocketAddr>,
}

/// MCP Server.
///
/// Owns the listener. `start` and `stop` are serialized so at most one
/// listener exists per server. Status reads never take the lifecycle lock.
pub struct McpServer<H: Handler> {
    info: ServerInfo,
    config: ServerConfig,
    dispatcher: Arc<Dispatcher<H>>,
    lifecycle: Mutex<Option<RunningListener>>,
    status: RwLock<Status>,
}

impl<H: Handler + 'static> McpServer<H> {
    /// Create a new MCP server.
    pub fn new(handler: H, info: ServerInfo, config: ServerConfig) -> Self {
        Self {
            info,
            config,
            dispatcher: Arc::new(Dispatcher::new(Arc::new(handler))),
            lifecycle: Mutex::new(None),
            status: RwLock::new(Status {
                state: ServerState::Uninitialized,
                addr: None,
            }),
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher<H>> {
        &self.dispatcher
    }

    /// Get current server state.
    pub fn state(&self) -> ServerState {
        self.status.read().state
    }

    /// Check if server is listening.
    pub fn is_listening(&self) -> bool {
        self.state() == ServerState::Listening
    }

    /// Address of the bound listener, if any.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.status.read().addr
    }

    /// Start on the configured port if the configuration enables the server.
    ///
    /// Returns `None` when disabled.
    pub async fn start_from_config(&self) -> LifecycleResult<Option<SocketAddr>> {
        if !self.config.enabled {
            info!("Server disabled by configuration");
            return Ok(None);
        }
        self.start(self.config.port).await.map(Some)
    }

    /// Bind `127.0.0.1:port` and serve until [`stop`](Self::stop).
    ///
    /// A running listener is stopped first. Port `0` picks a free port; the
    /// bound address is returned.
    #[instrument(skip(self), fields(server = %self.info.name))]
    pub async fn start(&self, port: u16) -> LifecycleResult<SocketAddr> {
        let mut lifecycle = self.lifecycle.lock().await;

        if lifecycle.is_some() {
            info!("Restarting: stopping current listener first");
            self.stop_locked(&mut lifecycle).await?;
        }

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|e| bind_error(port, e))?;
        let addr = listener.local_addr().map_err(|e| bind_error(port, e))?;

        let app = transport::router(
            Arc::clone(&self.dispatcher),
            HealthInfo::new(self.info.name.clone(), self.info.version.clone()),
            self.config.max_body_bytes,
        );

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        *lifecycle = Some(RunningListener {
            addr,
            shutdown,
            task,
        });
        *self.status.write() = Status {
            state: ServerState::Listening,
            addr: Some(addr),
        };

        info!(
            "{} v{} listening on http://{}",
            self.info.name, self.info.version, addr
        );
        Ok(addr)
    }

    /// Close the listener and release the port. No-op when not listening.
    pub async fn stop(&self) -> LifecycleResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        self.stop_locked(&mut lifecycle).await
    }

    async fn stop_locked(&self, lifecycle: &mut Option<RunningListener>) -> LifecycleResult<()> {
        let Some(RunningListener {
            addr,
            shutdown,
            mut task,
        }) = lifecycle.take()
        else {
            debug!("Stop requested while not listening");
            return Ok(());
        };

        info!("Stopping listener on {}", addr);
        *self.status.write() = Status {
            state: ServerState::Stopped,
            addr: None,
        };
        let _ = shutdown.send(());

        let joined = match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    "Connections still open after {:?}, aborting server task",
                    SHUTDOWN_GRACE
                );
                task.abort();
                task.await
            }
        };

        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Server on {} exited with error: {}", addr, e),
            Err(e) if e.is_cancelled() => debug!("Server task on {} aborted", addr),
            Err(e) => return Err(LifecycleError::Task(e.to_string())),
        }

        info!("Listener on {} closed", addr);
        Ok(())
    }
}

fn bind_error(port: u16, e: io::Error) -> LifecycleError {
    if e.kind() == io::ErrorKind::AddrInUse {
        LifecycleError::AddressInUse(port)
    } else {
        LifecycleError::Bind { port, source: e }
    }
}

/// Builder for MCP Server.
pub struct McpServerBuilder<H: Handler> {
    handler: Option<H>,
    config: ServerConfig,
}

impl<H: Handler + 'static> McpServerBuilder<H> {
    pub fn new() -> Self {
        Self {
            handler: None,
            config: ServerConfig::default(),
        }
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<McpServer<H>> {
        let handler = self.handler.ok_or_else(|| McpError::Internal {
            message: "Handler is required".into(),
        })?;

        let info = ServerInfo {
            name: self.config.name.to_string(),
            version: self.config.version.to_string(),
        };

        Ok(McpServer::new(handler, info, self.config))
    }
}

impl<H: Handler + 'static> Default for McpServerBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}
