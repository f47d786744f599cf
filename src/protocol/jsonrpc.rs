//! JSON-RPC 2.0 envelope types
//!
//! Requests are decoded leniently at the envelope level (a missing `jsonrpc`
//! or `id` is tolerated); parameters are validated per method in
//! [`super::methods`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Fixed protocol error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
        }
    }
}

/// Correlation id echoed from request to response
///
/// JSON-RPC allows a string, a number or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    String(String),
    Number(serde_json::Number),
    #[default]
    Null,
}

impl RpcId {
    /// Best-effort id recovery from a body that failed envelope decoding
    ///
    /// Returns `Null` unless the body is a JSON object whose `id` member is
    /// itself a valid id.
    pub fn salvage(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| value.get("id").cloned())
            .and_then(|id| serde_json::from_value(id).ok())
            .unwrap_or_default()
    }
}

impl From<&str> for RpcId {
    fn from(id: &str) -> Self {
        RpcId::String(id.to_string())
    }
}

impl From<i64> for RpcId {
    fn from(id: i64) -> Self {
        RpcId::Number(id.into())
    }
}

impl From<i32> for RpcId {
    fn from(id: i32) -> Self {
        RpcId::Number(id.into())
    }
}

/// Inbound request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Missing means empty, which no method matches
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: RpcId,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<RpcId>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

/// Error member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Outbound response envelope carrying exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: RpcId,
}

impl RpcResponse {
    pub fn success(id: RpcId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: RpcId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_variants_deserialize() {
        let string_id: RpcId = serde_json::from_value(json!("req-1")).unwrap();
        let number_id: RpcId = serde_json::from_value(json!(42)).unwrap();
        let null_id: RpcId = serde_json::from_value(json!(null)).unwrap();

        assert_eq!(string_id, RpcId::from("req-1"));
        assert_eq!(number_id, RpcId::from(42));
        assert_eq!(null_id, RpcId::Null);
        assert!(serde_json::from_value::<RpcId>(json!({"nested": true})).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: RpcRequest = serde_json::from_value(json!({"method": "tasks/get"})).unwrap();

        assert_eq!(request.jsonrpc, None);
        assert_eq!(request.params, Value::Null);
        assert_eq!(request.id, RpcId::Null);

        let request: RpcRequest = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(request.method, "");
        assert!(serde_json::from_value::<RpcRequest>(json!({"method": 7})).is_err());
    }

    #[test]
    fn test_salvage_id() {
        assert_eq!(
            RpcId::salvage(br#"{"jsonrpc":"2.0","method":7,"id":"abc"}"#),
            RpcId::from("abc")
        );
        assert_eq!(RpcId::salvage(br#"{"method":7,"id":3.5}"#), {
            let id: RpcId = serde_json::from_value(json!(3.5)).unwrap();
            id
        });
        assert_eq!(RpcId::salvage(b"{not json"), RpcId::Null);
        assert_eq!(RpcId::salvage(br#"[1,2,3]"#), RpcId::Null);
        assert_eq!(RpcId::salvage(br#"{"id":{"a":1}}"#), RpcId::Null);
    }

    #[test]
    fn test_error_response_shape() {
        let response = RpcResponse::error(
            RpcId::from(7),
            RpcError::new(ErrorCode::MethodNotFound, "Method not found"),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found"},
                "id": 7
            })
        );
    }

    #[test]
    fn test_success_response_keeps_null_id() {
        let response = RpcResponse::success(RpcId::Null, json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], Value::Null);
        assert!(value.get("error").is_none());
        assert!(!response.is_error());
    }
}
