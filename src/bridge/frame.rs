//! Frames exchanged with the execution context.
//!
//! Both directions travel as JSON text so that anything crossing the boundary
//! has already survived a serialization round.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outcome of a tool run as reported by the execution context.
///
/// At most one of `result` and `error` is set. If a misbehaving context sets
/// both, `error` wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ToolCallResult {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// A result of `None` without an error is reported as JSON `null`.
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Server → context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub request_id: Uuid,
    pub tool: String,
    pub args: Value,
}

/// Context → server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeReply {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub outcome: ToolCallResult,
}
