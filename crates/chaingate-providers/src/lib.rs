//! chaingate-providers — vendor adapters and chain registries for ChainGate.
//!
//! [`create_client`] turns an upstream's endpoint URL into a transport:
//! plain `http(s)://` endpoints get an [`HttpRpcClient`], `drpc://<api-key>`
//! gets a [`drpc::DrpcClient`] that pools one HTTP client per network.
//!
//! # Quick start
//! ```rust,no_run
//! use chaingate_core::{RpcTransport, UpstreamConfig};
//! use std::sync::Arc;
//!
//! let upstream = Arc::new(UpstreamConfig::new("drpc-main", "drpc://YOUR_API_KEY"));
//! let client = chaingate_providers::create_client(upstream).unwrap();
//! assert!(client.supports_network("evm:1"));
//! ```

pub mod drpc;

use std::sync::Arc;

use url::Url;

use chaingate_core::config::UpstreamConfig;
use chaingate_core::error::GatewayError;
use chaingate_core::transport::RpcTransport;
use chaingate_http::{HttpClientConfig, HttpRpcClient};

/// Build the transport for an upstream from its endpoint URL.
pub fn create_client(upstream: Arc<UpstreamConfig>) -> Result<Arc<dyn RpcTransport>, GatewayError> {
    let url = Url::parse(&upstream.endpoint).map_err(|e| GatewayError::InvalidUpstreamUrl {
        reason: format!("cannot parse endpoint of upstream '{}': {e}", upstream.id),
    })?;

    match url.scheme() {
        "http" | "https" => {
            let client =
                HttpRpcClient::new(&upstream.endpoint, HttpClientConfig::from_upstream(&upstream))?;
            tracing::debug!(upstream = %upstream.id, url = client.url(), "created HTTP client");
            Ok(Arc::new(client))
        }
        scheme if scheme.ends_with("drpc") => {
            let client = drpc::DrpcClient::new(Arc::clone(&upstream), &url)?;
            tracing::debug!(upstream = %upstream.id, "created dRPC client");
            Ok(Arc::new(client))
        }
        scheme => Err(GatewayError::InvalidUpstreamUrl {
            reason: format!("unsupported scheme '{scheme}' for upstream '{}'", upstream.id),
        }),
    }
}
