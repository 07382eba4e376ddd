//! Webhook relay configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Base address. Routes are appended to it.
    pub url: String,
    /// Seconds between liveness probes.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Request timeout in seconds, for probes and deliveries.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Additional headers sent with every delivery.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Secret for HMAC signing (optional).
    pub secret: Option<String>,
}

fn default_heartbeat_interval() -> u64 {
    10
}

fn default_timeout() -> u64 {
    5
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            timeout_seconds: default_timeout(),
            headers: HashMap::new(),
            secret: None,
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}
