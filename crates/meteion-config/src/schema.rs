//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP control server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Start listening as soon as the host loads.
    #[serde(default = "default_true")]
    pub auto_start: bool,

    /// Upper bound for one request/response exchange.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auto_start: default_true(),
            request_timeout_seconds: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    2019
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

/// Outbound webhook relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Base address; `/chat` and `/partyfinder` are appended to it.
    #[serde(default = "default_webhook_url")]
    pub url: String,

    #[serde(default)]
    pub auto_start: bool,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,

    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Enables HMAC signing of relayed payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            auto_start: false,
            heartbeat_interval_seconds: default_heartbeat_interval(),
            timeout_seconds: default_webhook_timeout(),
            headers: HashMap::new(),
            secret: None,
        }
    }
}

fn default_webhook_url() -> String {
    "http://127.0.0.1:2020".to_string()
}

fn default_heartbeat_interval() -> u64 {
    10
}

fn default_webhook_timeout() -> u64 {
    5
}

/// Chat gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How long a text command waits for a send already in progress.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files; `~` is expanded.
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.meteion/logs".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
