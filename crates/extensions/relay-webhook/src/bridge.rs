//! Turns host events into webhook deliveries.

use std::sync::Arc;

use tracing::warn;

use meteion_protocols::{ChatMessage, PartyFinderListing};

use crate::client::WebhookClient;
use crate::envelope::{ChatEntry, PartyFinderEntry};

pub const CHAT_ROUTE: &str = "/chat";
pub const PARTY_FINDER_ROUTE: &str = "/partyfinder";

/// Where bridged events go.
pub trait RelaySink: Send + Sync {
    fn is_connected(&self) -> bool;

    fn post_async(&self, body: String, route: &'static str);
}

impl RelaySink for WebhookClient {
    fn is_connected(&self) -> bool {
        WebhookClient::is_connected(self)
    }

    fn post_async(&self, body: String, route: &'static str) {
        WebhookClient::post_async(self, body, route)
    }
}

/// Host event handlers. Events are dropped, not serialized, while the
/// sink is disconnected.
pub struct HostEventBridge {
    sink: Arc<dyn RelaySink>,
}

impl HostEventBridge {
    pub fn new(sink: Arc<dyn RelaySink>) -> Self {
        Self { sink }
    }

    pub fn on_message(&self, msg: &ChatMessage) {
        if !self.sink.is_connected() {
            return;
        }
        match serde_json::to_string_pretty(&ChatEntry::from(msg)) {
            Ok(body) => self.sink.post_async(body, CHAT_ROUTE),
            Err(e) => warn!(error = %e, "Failed to serialize chat entry"),
        }
    }

    pub fn on_listing(&self, listing: &PartyFinderListing) {
        if !self.sink.is_connected() {
            return;
        }
        match serde_json::to_string(&PartyFinderEntry::from(listing)) {
            Ok(body) => self.sink.post_async(body, PARTY_FINDER_ROUTE),
            Err(e) => warn!(error = %e, "Failed to serialize listing entry"),
        }
    }
}
