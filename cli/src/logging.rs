//! Tracing initialisation for the `chaingate` binary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `CHAINGATE_LOG` sets the level (or a full filter directive),
    /// `CHAINGATE_LOG_JSON=1` switches to JSON output.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("CHAINGATE_LOG") {
            if !level.trim().is_empty() {
                config.level = level;
            }
        }
        config.json = std::env::var("CHAINGATE_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }

    /// Filter directive string, e.g. `"warn,chaingate_http=debug"`.
    pub fn directives(&self) -> String {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        let mut directives = self.level.clone();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
/// Call once at startup.
pub fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new(default_level()));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
