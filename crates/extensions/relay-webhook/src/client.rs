//! HTTP side of the relay: deliveries, the liveness probe and the
//! connectivity flag.

use std::sync::atomic::{AtomicBool, Ordering};

use hmac::{Hmac, Mac};
use parking_lot::{Mutex, RwLock};
use reqwest::{Client, RequestBuilder, Url};
use sha2::Sha256;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WebhookConfig;
use crate::error::RelayError;

/// Header carrying `sha256=<hex>` when a secret is configured.
pub const SIGNATURE_HEADER: &str = "X-Meteion-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Result of one heartbeat probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Alive { status: u16 },
    Down { reason: String },
}

impl ProbeOutcome {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive { .. })
    }
}

/// Webhook client.
///
/// Holds a handle to the runtime it was created on so host callbacks running
/// on foreign threads can still spawn deliveries.
pub struct WebhookClient {
    config: RwLock<WebhookConfig>,
    http: Client,
    runtime: Handle,
    connected: AtomicBool,
    // Serializes probe results against explicit disconnects.
    transition: Mutex<()>,
}

impl WebhookClient {
    /// Create a client bound to the current tokio runtime.
    pub fn new(config: WebhookConfig) -> Result<Self, RelayError> {
        let runtime = Handle::try_current().map_err(|_| RelayError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: WebhookConfig, runtime: Handle) -> Result<Self, RelayError> {
        validate_url(&config.url)?;
        let http = Client::builder()
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self {
            config: RwLock::new(config),
            http,
            runtime,
            connected: AtomicBool::new(false),
            transition: Mutex::new(()),
        })
    }

    pub fn config(&self) -> WebhookConfig {
        self.config.read().clone()
    }

    pub fn endpoint(&self) -> String {
        self.config.read().url.clone()
    }

    pub(crate) fn set_config(&self, config: WebhookConfig) -> Result<(), RelayError> {
        validate_url(&config.url)?;
        info!(url = %config.url, "Webhook endpoint changed");
        *self.config.write() = config;
        Ok(())
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Base address with `route` appended.
    pub fn route_url(&self, route: &str) -> String {
        join_route(&self.config.read().url, route)
    }

    fn build_request(&self, body: String, url: &str) -> RequestBuilder {
        let config = self.config.read();
        let mut request = self
            .http
            .post(url)
            .timeout(config.timeout())
            .header("Content-Type", "application/json");

        for (key, value) in &config.headers {
            request = request.header(key, value);
        }

        if let Some(ref secret) = config.secret {
            if let Some(signature) = sign_payload(&body, secret) {
                request = request.header(SIGNATURE_HEADER, signature);
            }
        }

        request.body(body)
    }

    /// Fire-and-forget POST.
    ///
    /// Returns immediately. Failures are logged and otherwise ignored; they
    /// never change the connectivity flag.
    pub fn post_async(&self, body: String, route: &str) {
        let url = self.route_url(route);
        let request = self.build_request(body, &url);
        self.runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(url = %url, "Webhook delivered");
                }
                Ok(response) => {
                    debug!(url = %url, status = %response.status(), "Webhook rejected delivery");
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Webhook delivery failed");
                }
            }
        });
    }

    /// GET the base address. Anything but a transport error, a timeout or
    /// a 5xx counts as alive.
    pub async fn probe(&self) -> ProbeOutcome {
        let (url, timeout) = {
            let config = self.config.read();
            (config.url.clone(), config.timeout())
        };

        match self.http.get(&url).timeout(timeout).send().await {
            Ok(response) if response.status().is_server_error() => ProbeOutcome::Down {
                reason: format!("HTTP {}", response.status()),
            },
            Ok(response) => ProbeOutcome::Alive {
                status: response.status().as_u16(),
            },
            Err(e) => ProbeOutcome::Down {
                reason: e.to_string(),
            },
        }
    }

    /// Apply a probe result unless the heartbeat was cancelled meanwhile.
    pub(crate) fn record_probe(&self, outcome: &ProbeOutcome, cancel: &CancellationToken) {
        let _guard = self.transition.lock();
        if cancel.is_cancelled() {
            return;
        }

        let alive = outcome.is_alive();
        let was = self.connected.swap(alive, Ordering::SeqCst);
        match (was, outcome) {
            (false, ProbeOutcome::Alive { status }) => {
                info!(url = %self.endpoint(), status, "Webhook endpoint reachable");
            }
            (true, ProbeOutcome::Down { reason }) => {
                warn!(url = %self.endpoint(), reason = %reason, "Webhook endpoint unreachable");
            }
            _ => {}
        }
    }

    pub(crate) fn mark_disconnected(&self) {
        let _guard = self.transition.lock();
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// `sha256=<hex>` HMAC of `body`. `None` if the key is rejected.
pub fn sign_payload(body: &str, secret: &str) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            warn!(error = %e, "Invalid webhook secret, sending unsigned");
            return None;
        }
    };
    mac.update(body.as_bytes());
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

fn join_route(base: &str, route: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), route)
}

fn validate_url(url: &str) -> Result<(), RelayError> {
    let parsed = Url::parse(url).map_err(|e| RelayError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RelayError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
