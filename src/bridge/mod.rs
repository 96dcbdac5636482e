//! Tool invocation bridge.
//!
//! Forwards `tools/call` requests to the execution context that holds host
//! state. The two sides talk over a pair of channels carrying JSON frames;
//! replies are matched to callers by request id. An in-process context uses
//! [`serve`]; one in another process attaches through [`carry`].

pub mod context;
pub mod frame;
pub mod stdio;

pub use context::{ContextChannel, ExecutionContext, entry_point, serve};
pub use frame::{BridgeReply, BridgeRequest, ToolCallResult};
pub use stdio::carry;

use crate::error::{BridgeError, BridgeResult};
use crate::tools::ToolRegistry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

type Waiters = Arc<DashMap<Uuid, oneshot::Sender<ToolCallResult>>>;

/// Server-side handle on an attached execution context.
#[derive(Clone)]
struct ContextLink {
    outbound: mpsc::UnboundedSender<String>,
    waiters: Waiters,
}

impl ContextLink {
    fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }
}

pub struct ToolBridge {
    registry: Arc<ToolRegistry>,
    link: RwLock<Option<ContextLink>>,
    timeout: Duration,
}

impl ToolBridge {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self {
            registry,
            link: RwLock::new(None),
            timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether an execution context is currently reachable.
    pub fn is_available(&self) -> bool {
        self.link.read().as_ref().is_some_and(ContextLink::is_open)
    }

    /// Attach a new execution context, replacing any previous one.
    ///
    /// Must be called from within a Tokio runtime: a task is spawned to route
    /// reply frames back to waiting callers.
    pub fn attach(&self) -> ContextChannel {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (rep_tx, mut rep_rx) = mpsc::unbounded_channel::<String>();
        let waiters: Waiters = Arc::new(DashMap::new());

        let link = ContextLink {
            outbound: req_tx,
            waiters: Arc::clone(&waiters),
        };

        if let Some(previous) = self.link.write().replace(link) {
            info!("Replacing attached execution context");
            previous.waiters.clear();
        }

        tokio::spawn(async move {
            while let Some(frame) = rep_rx.recv().await {
                route_reply(&waiters, &frame);
            }
            // Dropping the senders wakes every pending caller with `Disconnected`.
            waiters.clear();
            debug!("Reply channel closed");
        });

        ContextChannel {
            requests: req_rx,
            replies: rep_tx,
        }
    }

    /// Attach `context` and serve it on a background task.
    pub fn attach_context(&self, context: Arc<dyn ExecutionContext>) -> JoinHandle<()> {
        let channel = self.attach();
        tokio::spawn(serve(context, channel))
    }

    /// Detach the current execution context. In-flight calls fail with
    /// `Disconnected`.
    pub fn detach(&self) {
        if let Some(link) = self.link.write().take() {
            info!("Detaching execution context");
            link.waiters.clear();
        }
    }

    fn current_link(&self) -> Option<ContextLink> {
        let guard = self.link.read();
        guard.as_ref().filter(|link| link.is_open()).cloned()
    }

    /// Forward a tool call and wait for the context's reply.
    #[instrument(skip(self, args), fields(tool = %tool))]
    pub async fn invoke(&self, tool: &str, args: Value) -> BridgeResult<ToolCallResult> {
        if !self.registry.exists(tool) {
            warn!("Rejected call to unknown tool: {}", tool);
            return Err(BridgeError::ToolNotFound(tool.to_string()));
        }

        let Some(link) = self.current_link() else {
            warn!("Tool call to {} with no execution context attached", tool);
            return Err(BridgeError::NoExecutionContext);
        };

        let request_id = Uuid::new_v4();
        let frame = serde_json::to_string(&BridgeRequest {
            request_id,
            tool: tool.to_string(),
            args,
        })
        .map_err(|e| BridgeError::Marshal(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        link.waiters.insert(request_id, tx);

        if link.outbound.send(frame).is_err() {
            link.waiters.remove(&request_id);
            warn!("Execution context went away before {} was sent", request_id);
            return Err(BridgeError::NoExecutionContext);
        }

        debug!("Sent {} as {}", tool, request_id);

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => {
                warn!("Execution context dropped {}", request_id);
                Err(BridgeError::Disconnected)
            }
            Err(_) => {
                link.waiters.remove(&request_id);
                error!("Tool {} timed out after {:?}", tool, self.timeout);
                Err(BridgeError::Timeout(self.timeout))
            }
        }
    }

    /// Like [`invoke`](Self::invoke), folding a tool-level error into
    /// `BridgeError::ToolFailed`.
    pub async fn call(&self, tool: &str, args: Value) -> BridgeResult<Value> {
        self.invoke(tool, args)
            .await?
            .into_result()
            .map_err(BridgeError::ToolFailed)
    }
}

fn route_reply(waiters: &Waiters, frame: &str) {
    let reply = match serde_json::from_str::<BridgeReply>(frame) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Malformed reply frame: {}", e);
            return;
        }
    };

    match waiters.remove(&reply.request_id) {
        Some((_, tx)) => {
            if tx.send(reply.outcome).is_err() {
                debug!("Caller for {} already gone", reply.request_id);
            }
        }
        None => warn!("No waiter for reply: {}", reply.request_id),
    }
}
