//! Relay lifecycle: subscriptions plus heartbeat, started and stopped as
//! one unit.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use meteion_protocols::{ChatMessage, HostEvents, PartyFinderListing, Subscription};

use crate::bridge::HostEventBridge;
use crate::client::WebhookClient;
use crate::config::WebhookConfig;
use crate::error::RelayError;
use crate::heartbeat;

struct ActiveRelay {
    messages: Subscription,
    listings: Subscription,
    cancel: CancellationToken,
    heartbeat: JoinHandle<()>,
}

/// Webhook relay.
///
/// Registered means both host subscriptions are held and the heartbeat is
/// running. `start` and `stop` are idempotent.
pub struct WebhookRelay {
    client: Arc<WebhookClient>,
    events: Arc<dyn HostEvents>,
    active: Mutex<Option<ActiveRelay>>,
}

impl WebhookRelay {
    pub fn new(client: Arc<WebhookClient>, events: Arc<dyn HostEvents>) -> Self {
        Self {
            client,
            events,
            active: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &Arc<WebhookClient> {
        &self.client
    }

    pub fn is_registered(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Subscribe to host events and start the heartbeat. Returns `false` if
    /// already registered.
    pub fn start(&self) -> bool {
        let mut active = self.active.lock();
        if active.is_some() {
            debug!("Webhook relay already registered");
            return false;
        }

        let bridge = Arc::new(HostEventBridge::new(self.client.clone()));
        let on_message = bridge.clone();
        let messages = self
            .events
            .subscribe_messages(Arc::new(move |msg: &ChatMessage| on_message.on_message(msg)));
        let on_listing = bridge;
        let listings = self.events.subscribe_listings(Arc::new(
            move |listing: &PartyFinderListing| on_listing.on_listing(listing),
        ));

        let cancel = CancellationToken::new();
        let heartbeat = heartbeat::spawn(self.client.clone(), cancel.clone());

        *active = Some(ActiveRelay {
            messages,
            listings,
            cancel,
            heartbeat,
        });
        info!(url = %self.client.endpoint(), "Webhook relay registered");
        true
    }

    /// Release subscriptions, stop the heartbeat and mark the endpoint
    /// disconnected. Returns `false` if not registered.
    pub fn stop(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            debug!("Webhook relay not registered");
            return false;
        };

        active.cancel.cancel();
        active.heartbeat.abort();
        active.messages.unsubscribe();
        active.listings.unsubscribe();
        self.client.mark_disconnected();

        info!("Webhook relay unregistered");
        true
    }

    /// Replace the endpoint configuration. Only allowed while unregistered.
    pub fn set_endpoint(&self, config: WebhookConfig) -> Result<(), RelayError> {
        let active = self.active.lock();
        if active.is_some() {
            return Err(RelayError::EndpointLocked);
        }
        self.client.set_config(config)
    }
}

impl Drop for WebhookRelay {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
