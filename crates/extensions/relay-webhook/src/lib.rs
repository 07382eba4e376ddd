//! # Meteion Relay - Webhook
//!
//! Forwards host chat messages and party finder listings to an external
//! HTTP endpoint.
//!
//! Delivery is best-effort telemetry: every POST is a detached task, nothing
//! is retried or queued, and events observed while the endpoint is down are
//! dropped. A heartbeat probe owns the connectivity flag.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use meteion_relay_webhook::{WebhookClient, WebhookConfig, WebhookRelay};
//!
//! let client = WebhookClient::new(WebhookConfig::new("http://127.0.0.1:2020"))?;
//! let relay = WebhookRelay::new(Arc::new(client), host.events.clone());
//! relay.start();
//! ```

mod bridge;
mod client;
mod config;
mod envelope;
mod error;
mod heartbeat;
mod relay;

pub use bridge::{HostEventBridge, RelaySink, CHAT_ROUTE, PARTY_FINDER_ROUTE};
pub use client::{sign_payload, ProbeOutcome, WebhookClient, SIGNATURE_HEADER};
pub use config::WebhookConfig;
pub use envelope::{ChatEntry, PartyFinderEntry, PartyFinderEntryHost};
pub use error::RelayError;
pub use relay::WebhookRelay;
