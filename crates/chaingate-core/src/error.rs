//! Gateway error taxonomy and the translation into JSON-RPC errors.
//!
//! [`GatewayError`] is what flows between internal components. Callers never
//! see it directly: [`translate_to_json_rpc_exception`] is the single place
//! where an internal failure becomes a numeric JSON-RPC code and message.

use std::error::Error as StdError;
use std::iter;

use thiserror::Error;

use crate::response::JsonRpcError;

/// Numeric JSON-RPC error codes emitted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonRpcErrorCode {
    ClientSideException,
    UnsupportedException,
    InvalidArgument,
    ServerSideException,
    ParseException,
    CapacityExceeded,
    CallException,
    TransactionRejected,
    MissingData,
    NodeTimeout,
    Unauthorized,
    EvmReverted,
}

impl JsonRpcErrorCode {
    /// The wire value of this code.
    pub const fn code(self) -> i64 {
        match self {
            Self::ClientSideException => -32600,
            Self::UnsupportedException => -32601,
            Self::InvalidArgument => -32602,
            Self::ServerSideException => -32603,
            Self::ParseException => -32700,
            Self::CapacityExceeded => -32005,
            Self::CallException => -32000,
            Self::TransactionRejected => -32003,
            Self::MissingData => -32014,
            Self::NodeTimeout => -32015,
            Self::Unauthorized => -32016,
            Self::EvmReverted => 3,
        }
    }
}

impl std::fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which rate-limit budget was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    Auth,
    Project,
    Network,
    Upstream,
}

impl std::fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Project => write!(f, "project"),
            Self::Network => write!(f, "network"),
            Self::Upstream => write!(f, "upstream"),
        }
    }
}

/// A failure already expressed in JSON-RPC terms and safe to show to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("JSON-RPC exception {code}: {message}")]
pub struct JsonRpcException {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

impl JsonRpcException {
    pub fn new(code: JsonRpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach auxiliary data to the exception.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// The error object placed in a JSON-RPC response.
    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        JsonRpcError {
            code: self.code,
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }
}

impl From<JsonRpcException> for JsonRpcError {
    fn from(exception: JsonRpcException) -> Self {
        Self {
            code: exception.code,
            message: exception.message,
            data: exception.data,
        }
    }
}

/// Errors raised inside the gateway core and its transports.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Already classified; passes through translation unchanged.
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcException),

    #[error("{scope} rate-limit rule exceeded: {rule}")]
    RateLimited { scope: RateLimitScope, rule: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid network id '{0}', expected <architecture>:<chainId>")]
    InvalidNetworkId(String),

    #[error("network information is missing in the request")]
    MissingNetwork,

    #[error("unsupported network architecture for {vendor} client: {architecture}")]
    UnsupportedArchitecture {
        vendor: &'static str,
        architecture: String,
    },

    #[error("unsupported network chain ID for {vendor}: {chain_id}")]
    UnsupportedChain { vendor: &'static str, chain_id: u64 },

    #[error("invalid upstream URL: {reason}")]
    InvalidUpstreamUrl { reason: String },

    /// Connection-level failure reported by the HTTP stack.
    #[error("transport error calling {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("upstream returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled by caller")]
    Cancelled,
}

impl GatewayError {
    /// Message of the innermost error in the `source()` chain.
    pub fn deepest_message(&self) -> String {
        let deepest = iter::successors(Some(self as &(dyn StdError + 'static)), |&e| e.source())
            .last()
            .unwrap_or(self);
        deepest.to_string()
    }

    /// Returns `true` for rate-limit failures of any scope.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns `true` when no network call was attempted because the request
    /// could not be routed to a client.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidNetworkId(_)
                | Self::MissingNetwork
                | Self::UnsupportedArchitecture { .. }
                | Self::UnsupportedChain { .. }
                | Self::InvalidUpstreamUrl { .. }
        )
    }
}

const RATE_LIMIT_MESSAGE: &str = "rate-limit exceeded";
const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

fn error_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    iter::successors(Some(err), |&e| e.source())
}

fn gateway_errors<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a GatewayError> {
    error_chain(err).filter_map(|e| e.downcast_ref::<GatewayError>())
}

/// Translate an internal failure into the JSON-RPC exception shown to callers.
///
/// Rules, first match wins (each checked against the whole `source()` chain):
/// 1. an already classified [`JsonRpcException`] is returned unchanged;
/// 2. any [`GatewayError::RateLimited`] → `CapacityExceeded`, "rate-limit exceeded";
/// 3. [`GatewayError::Unauthorized`] → `Unauthorized`, "unauthorized";
/// 4. anything else → `ServerSideException` with the deepest message of a
///    [`GatewayError`], or "internal server error" for foreign errors.
pub fn translate_to_json_rpc_exception(err: &(dyn StdError + 'static)) -> JsonRpcException {
    let classified = error_chain(err).find_map(|e| {
        e.downcast_ref::<JsonRpcException>().cloned().or_else(|| {
            match e.downcast_ref::<GatewayError>() {
                Some(GatewayError::JsonRpc(exception)) => Some(exception.clone()),
                _ => None,
            }
        })
    });
    if let Some(exception) = classified {
        return exception;
    }

    if gateway_errors(err).any(GatewayError::is_rate_limited) {
        return JsonRpcException::new(JsonRpcErrorCode::CapacityExceeded, RATE_LIMIT_MESSAGE);
    }

    if gateway_errors(err).any(|e| matches!(e, GatewayError::Unauthorized { .. })) {
        return JsonRpcException::new(JsonRpcErrorCode::Unauthorized, UNAUTHORIZED_MESSAGE);
    }

    let message = err
        .downcast_ref::<GatewayError>()
        .map(GatewayError::deepest_message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| INTERNAL_ERROR_MESSAGE.to_string());

    JsonRpcException::new(JsonRpcErrorCode::ServerSideException, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("routing failed")]
    struct RoutingError {
        #[source]
        source: GatewayError,
    }

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct ForeignError;

    #[test]
    fn classified_exception_passes_through() {
        let original = JsonRpcException::new(JsonRpcErrorCode::EvmReverted, "execution reverted")
            .with_data("0x08c379a0");
        let err = GatewayError::from(original.clone());
        assert_eq!(translate_to_json_rpc_exception(&err), original);
    }

    #[test]
    fn every_rate_limit_scope_is_capacity_exceeded() {
        for scope in [
            RateLimitScope::Auth,
            RateLimitScope::Project,
            RateLimitScope::Network,
            RateLimitScope::Upstream,
        ] {
            let err = GatewayError::RateLimited {
                scope,
                rule: "100/s".into(),
            };
            let ex = translate_to_json_rpc_exception(&err);
            assert_eq!(ex.code, -32005, "scope {scope}");
            assert_eq!(ex.message, "rate-limit exceeded");
        }
    }

    #[test]
    fn unauthorized_maps_to_unauthorized_code() {
        let err = GatewayError::Unauthorized {
            reason: "secret token mismatch".into(),
        };
        let ex = translate_to_json_rpc_exception(&err);
        assert_eq!(ex.code, JsonRpcErrorCode::Unauthorized.code());
        assert_eq!(ex.message, "unauthorized");
    }

    #[test]
    fn classification_is_found_deeper_in_the_chain() {
        let err = RoutingError {
            source: GatewayError::RateLimited {
                scope: RateLimitScope::Network,
                rule: "evm:1".into(),
            },
        };
        let ex = translate_to_json_rpc_exception(&err);
        assert_eq!(ex.code, JsonRpcErrorCode::CapacityExceeded.code());
    }

    #[test]
    fn generic_error_uses_deepest_message() {
        let err = GatewayError::Transport {
            endpoint: "https://node.example".into(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        };
        let ex = translate_to_json_rpc_exception(&err);
        assert_eq!(ex.code, -32603);
        assert_eq!(ex.message, "connection refused");
    }

    #[test]
    fn foreign_error_gets_fixed_message() {
        let ex = translate_to_json_rpc_exception(&ForeignError);
        assert_eq!(ex.code, JsonRpcErrorCode::ServerSideException.code());
        assert_eq!(ex.message, "internal server error");
    }

    #[test]
    fn deepest_message_without_source_is_own_display() {
        let err = GatewayError::UnsupportedChain {
            vendor: "drpc",
            chain_id: 999,
        };
        assert_eq!(err.deepest_message(), "unsupported network chain ID for drpc: 999");
        assert!(err.is_resolution_error());
    }
}
