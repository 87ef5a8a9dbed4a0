//! The `RpcTransport` trait: the contract every upstream client implements.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::GatewayError;
use crate::request::NormalizedRequest;
use crate::response::NormalizedResponse;

/// Kind of upstream client behind an [`RpcTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientType {
    /// Plain JSON-RPC over HTTP to a single endpoint.
    HttpJsonRpc,
    /// dRPC gateway; one HTTP client per network.
    DrpcHttpJsonRpc,
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpJsonRpc => write!(f, "HttpJsonRpcClient"),
            Self::DrpcHttpJsonRpc => write!(f, "DrpcHttpJsonRpcClient"),
        }
    }
}

/// An upstream client the routing layer can hand requests to.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// `Debug` output must not expose credentials.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: std::fmt::Debug + Send + Sync + 'static {
    fn client_type(&self) -> ClientType;

    /// Whether this client can serve `network_id` (e.g. `"evm:1"`).
    ///
    /// Single-endpoint clients serve whatever they are pointed at.
    fn supports_network(&self, network_id: &str) -> bool {
        let _ = network_id;
        true
    }

    /// Send one request. `ctx` carries the caller's cancellation and deadline
    /// and must be forwarded unchanged to whatever performs the I/O.
    async fn send_request(
        &self,
        ctx: &RequestContext,
        req: &NormalizedRequest,
    ) -> Result<NormalizedResponse, GatewayError>;

    /// Endpoint identifier safe to log (no credentials).
    fn url(&self) -> &str;
}
