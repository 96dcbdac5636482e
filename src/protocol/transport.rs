//! HTTP transport for JSON-RPC messages.
//!
//! A single catch-all route: `OPTIONS` answers preflight, `GET /` is a health
//! check, `POST` on any path carries one JSON-RPC request. Protocol outcomes
//! travel inside the JSON envelope; the HTTP status is always 200.

use crate::error::ProtocolError;
use crate::protocol::handler::{Dispatcher, Handler};
use crate::protocol::types::{JsonRpcError, JsonRpcResponse};
use axum::{
    Json, Router,
    body::{self, Body},
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, trace, warn};

/// Fixed descriptor returned by `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    pub service: String,
    pub version: String,
    pub protocol: &'static str,
}

impl HealthInfo {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: "ok",
            service: service.into(),
            version: version.into(),
            protocol: "MCP over HTTP",
        }
    }
}

struct TransportState<H: Handler> {
    dispatcher: Arc<Dispatcher<H>>,
    health: Arc<HealthInfo>,
    max_body_bytes: usize,
}

impl<H: Handler> Clone for TransportState<H> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            health: Arc::clone(&self.health),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Build the HTTP router serving `dispatcher`.
pub fn router<H: Handler + 'static>(
    dispatcher: Arc<Dispatcher<H>>,
    health: HealthInfo,
    max_body_bytes: usize,
) -> Router {
    let state = TransportState {
        dispatcher,
        health: Arc::new(health),
        max_body_bytes,
    };

    Router::new()
        .fallback(handle_http::<H>)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}

async fn handle_http<H: Handler + 'static>(
    State(state): State<TransportState<H>>,
    request: Request,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    trace!("{} {}", method, path);

    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else if method == Method::GET && (path.is_empty() || path == "/") {
        (StatusCode::OK, Json(state.health.as_ref().clone())).into_response()
    } else if method == Method::POST {
        let response = handle_post(&state, request.into_body()).await;
        rpc_response(&response)
    } else {
        warn!("Rejected {} {}", method, path);
        rpc_response(&rejected(ProtocolError::InvalidRequest))
    }
}

async fn handle_post<H: Handler>(state: &TransportState<H>, body: Body) -> JsonRpcResponse {
    let bytes = match body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return rejected(ProtocolError::ParseError);
        }
    };

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse request body: {}", e);
            return rejected(ProtocolError::ParseError);
        }
    };

    state.dispatcher.dispatch_value(value).await
}

/// Transport-level rejection; the id is never known here.
fn rejected(error: ProtocolError) -> JsonRpcResponse {
    JsonRpcResponse::error(None, JsonRpcError::from(&error))
}

fn rpc_response(response: &JsonRpcResponse) -> Response {
    debug!("Sending response: id={:?}", response.id);
    (StatusCode::OK, Json(response)).into_response()
}
