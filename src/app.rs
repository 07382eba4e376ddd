//! The Meteion application object.
//!
//! Owns the action registry, the control server and the webhook relay, and
//! wires them to the host capabilities it was given.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use meteion_api::{ControlConfig, ControlServer, ServerError};
use meteion_config::Config;
use meteion_core::{ActionHandler, ActionRegistry, BuiltinActions};
use meteion_protocols::HostCapabilities;
use meteion_relay_webhook::{RelayError, WebhookClient, WebhookConfig, WebhookRelay};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Webhook relay: {0}")]
    Relay(#[from] RelayError),
}

pub struct Meteion {
    config: Config,
    registry: Arc<ActionRegistry>,
    builtins: BuiltinActions,
    server: ControlServer,
    relay: WebhookRelay,
}

impl Meteion {
    /// Build the control plane and bind the built-in actions. Nothing is
    /// started yet.
    pub fn new(config: Config, host: HostCapabilities) -> Result<Self, AppError> {
        let registry = Arc::new(ActionRegistry::new());
        let builtins = BuiltinActions::from_host(
            &host,
            Duration::from_millis(config.chat.lock_timeout_ms),
        );
        builtins.install(&registry);

        let server = ControlServer::new(control_config(&config), registry.clone());
        let client = WebhookClient::new(relay_config(&config))?;
        let relay = WebhookRelay::new(Arc::new(client), host.events.clone());

        Ok(Self {
            config,
            registry,
            builtins,
            server,
            relay,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn server(&self) -> &ControlServer {
        &self.server
    }

    pub fn relay(&self) -> &WebhookRelay {
        &self.relay
    }

    /// Start whatever the configuration marks as auto-start.
    pub async fn start(&self) {
        if self.config.server.auto_start {
            self.server_start(self.config.server.port).await;
        }
        if self.config.webhook.auto_start {
            self.webhook_start();
        }
        info!(
            actions = self.registry.len(),
            server = %self.server.state(),
            webhook = self.relay.is_registered(),
            "Meteion loaded"
        );
    }

    /// Start the control server on `port`. Failures are logged, not returned.
    pub async fn server_start(&self, port: u16) -> Option<SocketAddr> {
        self.server
            .on_exception(Arc::new(|err: &ServerError, port: u16| {
                error!("Cannot listen on {}: {}", port, err);
            }));
        self.server.start(port).await
    }

    pub async fn server_stop(&self) -> bool {
        self.server.stop().await
    }

    pub fn webhook_start(&self) -> bool {
        self.relay.start()
    }

    pub fn webhook_stop(&self) -> bool {
        self.relay.stop()
    }

    /// Point the relay at a different endpoint. Only allowed while stopped.
    pub fn set_webhook_url(&self, url: &str) -> Result<(), AppError> {
        let mut config = self.relay.client().config();
        config.url = url.to_string();
        self.relay.set_endpoint(config)?;
        Ok(())
    }

    pub fn set_action(&self, name: &str, handler: ActionHandler) {
        self.registry.register(name, handler);
    }

    pub fn clear_actions(&self) {
        self.registry.clear();
    }

    /// Rebind `command`, `waymark`/`place` and `query`.
    pub fn restore_builtin_actions(&self) {
        self.builtins.install(&self.registry);
    }

    pub fn do_action(&self, name: &str, payload: &str) -> String {
        self.registry.dispatch(name, payload)
    }

    /// Stop the server and the relay, then drop every action.
    pub async fn shutdown(&self) {
        self.server_stop().await;
        self.webhook_stop();
        self.clear_actions();
        info!("Meteion unloaded");
    }
}

fn control_config(config: &Config) -> ControlConfig {
    ControlConfig {
        host: config.server.host.clone(),
        request_timeout: Duration::from_secs(config.server.request_timeout_seconds),
        max_body_bytes: config.server.max_body_bytes,
    }
}

fn relay_config(config: &Config) -> WebhookConfig {
    WebhookConfig {
        url: config.webhook.url.clone(),
        heartbeat_interval_seconds: config.webhook.heartbeat_interval_seconds,
        timeout_seconds: config.webhook.timeout_seconds,
        headers: config.webhook.headers.clone(),
        secret: config.webhook.secret.clone(),
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
