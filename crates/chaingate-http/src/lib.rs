//! chaingate-http — generic HTTP JSON-RPC transport for ChainGate.
//!
//! [`HttpRpcClient`] posts one normalized request to one endpoint and decodes
//! whatever comes back with the lenient response decoder. Vendor adapters in
//! `chaingate-providers` build one of these per network.

pub mod client;

pub use client::{HttpClientConfig, HttpRpcClient};
