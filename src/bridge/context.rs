//! Execution-context side of the bridge.
//!
//! The host implements [`ExecutionContext`] and hands it to [`serve`] together
//! with the [`ContextChannel`] obtained from `ToolBridge::attach`. Every request
//! frame goes through [`entry_point`], which guarantees a reply even when the
//! tool errors or panics.

use crate::bridge::frame::{BridgeReply, BridgeRequest, ToolCallResult};
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Host environment able to run tools against live application state.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    async fn invoke(&self, tool: &str, args: Value) -> Result<Value, String>;
}

/// Context-side ends of an attached bridge link.
pub struct ContextChannel {
    pub requests: mpsc::UnboundedReceiver<String>,
    pub replies: mpsc::UnboundedSender<String>,
}

/// Run one tool call and always produce a reply.
pub async fn entry_point(context: Arc<dyn ExecutionContext>, request: BridgeRequest) -> BridgeReply {
    let BridgeRequest {
        request_id,
        tool,
        args,
    } = request;

    debug!("Running tool {} ({})", tool, request_id);

    // Run on its own task so a panic surfaces as a JoinError instead of
    // unwinding through the serve loop.
    let handle = tokio::spawn(async move { context.invoke(&tool, args).await });

    let outcome = match handle.await {
        Ok(Ok(value)) => ToolCallResult::ok(value),
        Ok(Err(message)) => ToolCallResult::err(message),
        Err(e) if e.is_panic() => ToolCallResult::err(panic_message(e.into_panic())),
        Err(_) => ToolCallResult::err("Tool execution was cancelled"),
    };

    BridgeReply {
        request_id,
        outcome,
    }
}

/// Serve request frames until the bridge detaches.
pub async fn serve(context: Arc<dyn ExecutionContext>, channel: ContextChannel) {
    let ContextChannel {
        mut requests,
        replies,
    } = channel;

    info!("Execution context attached");

    while let Some(frame) = requests.recv().await {
        let request = match serde_json::from_str::<BridgeRequest>(&frame) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed request frame: {}", e);
                if let Some(request_id) = recover_request_id(&frame) {
                    send_reply(
                        &replies,
                        &BridgeReply {
                            request_id,
                            outcome: ToolCallResult::err(format!("Malformed request: {}", e)),
                        },
                    );
                }
                continue;
            }
        };

        let context = Arc::clone(&context);
        let replies = replies.clone();
        tokio::spawn(async move {
            let reply = entry_point(context, request).await;
            send_reply(&replies, &reply);
        });
    }

    info!("Execution context detached");
}

fn send_reply(replies: &mpsc::UnboundedSender<String>, reply: &BridgeReply) {
    let frame = match serde_json::to_string(reply) {
        Ok(frame) => frame,
        Err(e) => {
            // Tool results are already JSON values, so only a broken
            // serializer gets here. Report it in place of the result.
            warn!("Failed to encode reply {}: {}", reply.request_id, e);
            let fallback = BridgeReply {
                request_id: reply.request_id,
                outcome: ToolCallResult::err(format!("Failed to encode result: {}", e)),
            };
            match serde_json::to_string(&fallback) {
                Ok(frame) => frame,
                Err(_) => return,
            }
        }
    };

    if replies.send(frame).is_err() {
        debug!("Bridge gone, dropping reply {}", reply.request_id);
    }
}

fn recover_request_id(frame: &str) -> Option<Uuid> {
    let value: Value = serde_json::from_str(frame).ok()?;
    serde_json::from_value(value.get("requestId")?.clone()).ok()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("Tool panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("Tool panicked: {}", s)
    } else {
        "Tool panicked".to_string()
    }
}
