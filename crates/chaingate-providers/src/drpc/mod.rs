//! dRPC vendor adapter.
//!
//! One upstream URL (`drpc://<api-key>`) fans out to one HTTP client per
//! network, created on first use and cached for the adapter's lifetime.

pub mod registry;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use url::Url;

use chaingate_core::config::UpstreamConfig;
use chaingate_core::context::RequestContext;
use chaingate_core::error::GatewayError;
use chaingate_core::network::{Architecture, Network};
use chaingate_core::request::NormalizedRequest;
use chaingate_core::response::NormalizedResponse;
use chaingate_core::transport::{ClientType, RpcTransport};
use chaingate_http::{HttpClientConfig, HttpRpcClient};

const VENDOR: &str = "drpc";

/// Builds the per-network transport from its endpoint URL.
pub type TransportBuilder = Arc<
    dyn Fn(&str, &UpstreamConfig) -> Result<Arc<dyn RpcTransport>, GatewayError> + Send + Sync,
>;

fn http_transport(url: &str, upstream: &UpstreamConfig) -> Result<Arc<dyn RpcTransport>, GatewayError> {
    let client = HttpRpcClient::new(url, HttpClientConfig::from_upstream(upstream))?;
    Ok(Arc::new(client))
}

/// Lazily pooled dRPC client, keyed by network id.
pub struct DrpcClient {
    upstream: Arc<UpstreamConfig>,
    api_key: String,
    build: TransportBuilder,
    clients: RwLock<HashMap<String, Arc<dyn RpcTransport>>>,
}

impl std::fmt::Debug for DrpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrpcClient")
            .field("upstream", &self.upstream.id)
            .field("api_key", &"<redacted>")
            .field("clients", &self.client_count())
            .finish()
    }
}

impl DrpcClient {
    /// Validate a `…drpc://<api-key>` URL and create an empty pool.
    pub fn new(upstream: Arc<UpstreamConfig>, url: &Url) -> Result<Self, GatewayError> {
        if !url.scheme().ends_with(VENDOR) {
            return Err(GatewayError::InvalidUpstreamUrl {
                reason: format!("invalid dRPC URL scheme: {}", url.scheme()),
            });
        }
        let api_key = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                return Err(GatewayError::InvalidUpstreamUrl {
                    reason: "missing dRPC API key in URL".into(),
                })
            }
        };

        Ok(Self {
            upstream,
            api_key,
            build: Arc::new(http_transport),
            clients: RwLock::new(HashMap::new()),
        })
    }

    /// Replace the per-network transport constructor.
    pub fn with_transport_builder(mut self, build: TransportBuilder) -> Self {
        self.build = build;
        self
    }

    /// Client for `network`, created on first use.
    ///
    /// Concurrent first calls for the same network build exactly one client.
    /// Failures are returned to the caller and nothing is cached.
    pub fn resolve(&self, network: &Network) -> Result<Arc<dyn RpcTransport>, GatewayError> {
        let key = network.id();
        if let Some(client) = self.read_pool().get(key) {
            return Ok(Arc::clone(client));
        }

        let mut pool = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = pool.get(key) {
            return Ok(Arc::clone(client));
        }

        if network.architecture() != &Architecture::Evm {
            return Err(GatewayError::UnsupportedArchitecture {
                vendor: VENDOR,
                architecture: network.architecture().to_string(),
            });
        }
        let chain_id = network
            .evm_chain_id()
            .ok_or_else(|| GatewayError::InvalidNetworkId(key.to_string()))?;
        let slug = registry::network_slug(chain_id).ok_or(GatewayError::UnsupportedChain {
            vendor: VENDOR,
            chain_id,
        })?;

        let client = (self.build)(&registry::http_url(slug, &self.api_key), &self.upstream)?;
        tracing::debug!(
            upstream = %self.upstream.id,
            network = key,
            slug,
            "created dRPC network client"
        );
        pool.insert(key.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Number of network clients created so far.
    pub fn client_count(&self) -> usize {
        self.read_pool().len()
    }

    fn read_pool(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn RpcTransport>>> {
        self.clients.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RpcTransport for DrpcClient {
    fn client_type(&self) -> ClientType {
        ClientType::DrpcHttpJsonRpc
    }

    fn supports_network(&self, network_id: &str) -> bool {
        network_id
            .strip_prefix("evm:")
            .and_then(|chain_id| chain_id.parse::<u64>().ok())
            .is_some_and(registry::is_supported)
    }

    async fn send_request(
        &self,
        ctx: &RequestContext,
        req: &NormalizedRequest,
    ) -> Result<NormalizedResponse, GatewayError> {
        let network = req.network().ok_or(GatewayError::MissingNetwork)?;
        let client = self.resolve(network)?;
        client.send_request(ctx, req).await
    }

    fn url(&self) -> &str {
        registry::BASE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use chaingate_core::request::JsonRpcRequest;
    use chaingate_core::request::RpcId;

    #[derive(Debug)]
    struct StubTransport {
        url: String,
    }

    #[async_trait]
    impl RpcTransport for StubTransport {
        fn client_type(&self) -> ClientType {
            ClientType::HttpJsonRpc
        }

        async fn send_request(
            &self,
            _ctx: &RequestContext,
            req: &NormalizedRequest,
        ) -> Result<NormalizedResponse, GatewayError> {
            Ok(NormalizedResponse::with_result(req.id().clone(), &self.url).unwrap())
        }

        fn url(&self) -> &str {
            &self.url
        }
    }

    fn drpc_url() -> Url {
        Url::parse("drpc://test-key").unwrap()
    }

    fn counting_client(builds: Arc<AtomicUsize>) -> DrpcClient {
        let upstream = Arc::new(UpstreamConfig::new("drpc-test", "drpc://test-key"));
        DrpcClient::new(upstream, &drpc_url())
            .unwrap()
            .with_transport_builder(Arc::new(move |url: &str, _: &UpstreamConfig| {
                builds.fetch_add(1, Ordering::SeqCst);
                let transport: Arc<dyn RpcTransport> = Arc::new(StubTransport { url: url.into() });
                Ok(transport)
            }))
    }

    #[test]
    fn concurrent_resolution_builds_one_client() {
        let builds = Arc::new(AtomicUsize::new(0));
        let client = Arc::new(counting_client(Arc::clone(&builds)));
        let barrier = Arc::new(Barrier::new(50));
        let network = Network::evm(1);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let client = Arc::clone(&client);
                let barrier = Arc::clone(&barrier);
                let network = network.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    client.resolve(&network).unwrap()
                })
            })
            .collect();
        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(client.client_count(), 1);
        assert!(resolved.iter().all(|c| Arc::ptr_eq(c, &resolved[0])));
        assert_eq!(
            resolved[0].url(),
            "https://lb.drpc.org/ogrpc?network=ethereum&dkey=test-key"
        );
    }

    #[test]
    fn distinct_networks_get_distinct_clients() {
        let builds = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&builds));
        let mainnet = client.resolve(&Network::evm(1)).unwrap();
        let base = client.resolve(&Network::evm(8453)).unwrap();
        assert!(!Arc::ptr_eq(&mainnet, &base));
        assert_eq!(client.client_count(), 2);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsupported_chain_is_not_cached() {
        let builds = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&builds));
        let err = client.resolve(&Network::evm(123_456_789)).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UnsupportedChain { vendor: "drpc", chain_id: 123_456_789 }
        ));
        assert_eq!(client.client_count(), 0);
        assert_eq!(builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_evm_network_is_rejected() {
        let client = counting_client(Arc::new(AtomicUsize::new(0)));
        let err = client.resolve(&Network::parse("solana:mainnet").unwrap()).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedArchitecture { .. }));
        assert_eq!(client.client_count(), 0);
    }

    #[test]
    fn supports_network_checks_registry() {
        let client = counting_client(Arc::new(AtomicUsize::new(0)));
        assert!(client.supports_network("evm:1"));
        assert!(client.supports_network("evm:42161"));
        assert!(!client.supports_network("evm:123456789"));
        assert!(client.supports_network("evm:999999999"));
        assert!(!client.supports_network("evm:abc"));
        assert!(!client.supports_network("solana:mainnet"));
    }

    #[test]
    fn rejects_bad_urls() {
        let upstream = Arc::new(UpstreamConfig::default());
        let wrong_scheme = Url::parse("https://test-key").unwrap();
        assert!(matches!(
            DrpcClient::new(Arc::clone(&upstream), &wrong_scheme),
            Err(GatewayError::InvalidUpstreamUrl { .. })
        ));
        let no_key = Url::parse("drpc:///").unwrap();
        assert!(matches!(
            DrpcClient::new(upstream, &no_key),
            Err(GatewayError::InvalidUpstreamUrl { .. })
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = counting_client(Arc::new(AtomicUsize::new(0)));
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn send_request_delegates_to_network_client() {
        let client = counting_client(Arc::new(AtomicUsize::new(0)));
        let req = NormalizedRequest::new(JsonRpcRequest::new(5, "eth_chainId", vec![]))
            .with_network(Arc::new(Network::evm(10)));

        let resp = client
            .send_request(&RequestContext::background(), &req)
            .await
            .unwrap();
        assert_eq!(resp.id(), &RpcId::Number(5));
        assert_eq!(
            *resp.parsed_result().unwrap().unwrap(),
            serde_json::json!("https://lb.drpc.org/ogrpc?network=optimism&dkey=test-key")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sends_share_one_client() {
        let builds = Arc::new(AtomicUsize::new(0));
        let client = Arc::new(counting_client(Arc::clone(&builds)));
        let network = Arc::new(Network::evm(8453));

        let sends = (0..32u64).map(|id| {
            let client = Arc::clone(&client);
            let req = NormalizedRequest::new(JsonRpcRequest::new(id, "eth_blockNumber", vec![]))
                .with_network(Arc::clone(&network));
            tokio::spawn(async move {
                client.send_request(&RequestContext::background(), &req).await
            })
        });
        let results = futures::future::join_all(sends).await;

        for (id, result) in results.into_iter().enumerate() {
            let resp = result.unwrap().unwrap();
            assert_eq!(resp.id(), &RpcId::Number(id as u64));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(client.client_count(), 1);
    }

    #[tokio::test]
    async fn send_request_without_network() {
        let client = counting_client(Arc::new(AtomicUsize::new(0)));
        let req = NormalizedRequest::new(JsonRpcRequest::new(1, "eth_chainId", vec![]));
        let err = client
            .send_request(&RequestContext::background(), &req)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingNetwork));
        assert_eq!(client.client_count(), 0);
    }
}
