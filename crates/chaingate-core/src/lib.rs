//! chaingate-core — normalized JSON-RPC types and policies for ChainGate.
//!
//! # Overview
//!
//! ChainGate fronts many blockchain node providers behind one JSON-RPC API.
//! Upstreams disagree on response shapes, so everything entering the gateway
//! is normalized here first. The core crate defines:
//!
//! - [`NormalizedRequest`] — caller request, network binding and [`cache_hash`](NormalizedRequest::cache_hash)
//! - [`NormalizedResponse`] — lenient upstream decoding and a lazily parsed result
//! - [`GatewayError`] / [`translate_to_json_rpc_exception`] — internal failures → JSON-RPC codes
//! - [`Network`] — `"<architecture>:<chainId>"` network identity
//! - [`RequestContext`] — cancellation and deadline handed to transports
//! - [`RpcTransport`] — the trait every upstream client implements

pub mod config;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod network;
pub mod request;
pub mod response;
pub mod transport;

pub use config::UpstreamConfig;
pub use context::{CancelHandle, RequestContext};
pub use error::{
    translate_to_json_rpc_exception, GatewayError, JsonRpcErrorCode, JsonRpcException,
    RateLimitScope,
};
pub use fingerprint::FingerprintError;
pub use network::{Architecture, Network};
pub use request::{JsonRpcRequest, NormalizedRequest, RpcId, RpcParam};
pub use response::{JsonRpcError, NormalizedResponse, ResponseError};
pub use transport::{ClientType, RpcTransport};
