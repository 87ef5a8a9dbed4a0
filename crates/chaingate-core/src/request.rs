//! JSON-RPC request wire types and the normalized request envelope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{GatewayError, JsonRpcErrorCode, JsonRpcException};
use crate::fingerprint::{self, FingerprintError};
use crate::network::Network;

/// JSON-RPC request ID — string, number, null, or anything else a caller sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    #[default]
    Null,
    Other(Value),
}

impl RpcId {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for RpcId {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::String(s),
            Value::Number(ref n) => match n.as_u64() {
                Some(n) => Self::Number(n),
                None => Self::Other(value),
            },
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

fn default_version() -> String {
    "2.0".into()
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Vec<RpcParam>,
    #[serde(default)]
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: default_version(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// A caller request as seen by the gateway: the JSON-RPC body plus the
/// network the routing layer bound it to.
///
/// Immutable once built; share it as `Arc<NormalizedRequest>` across tasks.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    body: JsonRpcRequest,
    network: Option<Arc<Network>>,
}

impl NormalizedRequest {
    pub fn new(body: JsonRpcRequest) -> Self {
        Self {
            body,
            network: None,
        }
    }

    /// Parse a caller-supplied request body.
    ///
    /// Malformed bodies fail with a JSON-RPC parse exception, which the
    /// translator hands back to the caller as-is.
    pub fn from_slice(raw: &[u8]) -> Result<Self, GatewayError> {
        let body: JsonRpcRequest = serde_json::from_slice(raw).map_err(|err| {
            JsonRpcException::new(
                JsonRpcErrorCode::ParseException,
                format!("failed to parse json-rpc request: {err}"),
            )
        })?;
        Ok(Self::new(body))
    }

    /// Bind the request to the network it will be served on.
    pub fn with_network(mut self, network: Arc<Network>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn network(&self) -> Option<&Arc<Network>> {
        self.network.as_ref()
    }

    pub fn method(&self) -> &str {
        &self.body.method
    }

    pub fn params(&self) -> &[RpcParam] {
        &self.body.params
    }

    pub fn id(&self) -> &RpcId {
        &self.body.id
    }

    /// The JSON-RPC body exactly as it is forwarded upstream.
    pub fn json_rpc(&self) -> &JsonRpcRequest {
        &self.body
    }

    /// Deterministic cache / coalescing key: `"<method>:<hex digest>"`.
    ///
    /// An error means the request is not cacheable; it must not fail the
    /// request itself.
    pub fn cache_hash(&self) -> Result<String, FingerprintError> {
        fingerprint::cache_hash(&self.body.method, &self.body.params)
    }

    /// Fields worth logging for this request.
    pub fn log_projection(&self) -> Value {
        json!({
            "method": self.body.method,
            "params": self.body.params,
            "id": self.body.id,
            "network": self.network.as_ref().map(|n| n.id()),
        })
    }
}

impl From<JsonRpcRequest> for NormalizedRequest {
    fn from(body: JsonRpcRequest) -> Self {
        Self::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate_to_json_rpc_exception;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(1, "eth_blockNumber", vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_blockNumber\""));
    }

    #[test]
    fn from_slice_fills_defaults() {
        let req = NormalizedRequest::from_slice(br#"{"method":"eth_chainId"}"#).unwrap();
        assert_eq!(req.method(), "eth_chainId");
        assert!(req.params().is_empty());
        assert!(req.id().is_null());
        assert_eq!(req.json_rpc().jsonrpc, "2.0");
        assert!(req.network().is_none());
    }

    #[test]
    fn from_slice_keeps_string_ids() {
        let req = NormalizedRequest::from_slice(
            br#"{"jsonrpc":"2.0","id":"abc-1","method":"eth_call","params":[{"to":"0x1"},"latest"]}"#,
        )
        .unwrap();
        assert_eq!(req.id(), &RpcId::String("abc-1".into()));
        assert_eq!(req.params().len(), 2);
    }

    #[test]
    fn malformed_request_is_a_parse_exception() {
        let err = NormalizedRequest::from_slice(b"{not json").unwrap_err();
        let ex = translate_to_json_rpc_exception(&err);
        assert_eq!(ex.code, JsonRpcErrorCode::ParseException.code());
        assert!(ex.message.starts_with("failed to parse json-rpc request"));
    }

    #[test]
    fn log_projection_includes_network() {
        let req = NormalizedRequest::new(JsonRpcRequest::new(7, "eth_blockNumber", vec![]))
            .with_network(Arc::new(Network::evm(1)));
        let projection = req.log_projection();
        assert_eq!(projection["method"], "eth_blockNumber");
        assert_eq!(projection["id"], 7);
        assert_eq!(projection["network"], "evm:1");
    }

    #[test]
    fn rpc_id_from_value() {
        assert_eq!(RpcId::from(json!(5)), RpcId::Number(5));
        assert_eq!(RpcId::from(json!("x")), RpcId::String("x".into()));
        assert_eq!(RpcId::from(Value::Null), RpcId::Null);
        assert_eq!(RpcId::from(json!(-1)), RpcId::Other(json!(-1)));
    }
}
