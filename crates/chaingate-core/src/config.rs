//! Upstream configuration shared by transports and vendor adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// One configured upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Name used in logs.
    pub id: String,
    /// `https://…` for a plain node, or a vendor URL such as `drpc://<api-key>`.
    pub endpoint: String,
    /// Per-request timeout applied by the HTTP transport.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new("default", "")
    }
}
