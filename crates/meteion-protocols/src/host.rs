//! Host capability contracts.
//!
//! The control plane never reaches into global host state. Everything it
//! needs is handed over as a [`HostCapabilities`] bundle at construction.

use std::sync::Arc;

use crate::error::HostError;
use crate::event::{ChatMessage, PartyFinderListing};
use crate::subscription::{EventHandler, EventHub, Subscription};

/// Sends one line of chat text (including slash commands) through the host.
pub trait ChatSender: Send + Sync {
    fn send_chat(&self, text: &str) -> Result<(), HostError>;
}

/// Answers status queries about host state.
pub trait StatusQuery: Send + Sync {
    fn query_status(&self, payload: &str) -> Result<String, HostError>;
}

/// Places field markers described by the payload.
pub trait WaymarkPlacer: Send + Sync {
    fn place_waymarks(&self, payload: &str) -> Result<String, HostError>;
}

/// Host event sources relayed to the webhook endpoint.
pub trait HostEvents: Send + Sync {
    fn subscribe_messages(&self, handler: EventHandler<ChatMessage>) -> Subscription;

    fn subscribe_listings(&self, handler: EventHandler<PartyFinderListing>) -> Subscription;
}

/// Everything the control plane needs from its host.
#[derive(Clone)]
pub struct HostCapabilities {
    pub chat: Arc<dyn ChatSender>,
    pub status: Arc<dyn StatusQuery>,
    pub waymarks: Arc<dyn WaymarkPlacer>,
    pub events: Arc<dyn HostEvents>,
}

/// [`HostEvents`] backed by two in-process hubs.
///
/// Hosts that already own an event loop publish into the hubs; the relay
/// only ever sees the [`HostEvents`] side.
pub struct HostEventHub {
    messages: EventHub<ChatMessage>,
    listings: EventHub<PartyFinderListing>,
}

impl HostEventHub {
    pub fn new() -> Self {
        Self {
            messages: EventHub::new("chat"),
            listings: EventHub::new("partyfinder"),
        }
    }

    pub fn publish_message(&self, message: &ChatMessage) -> usize {
        self.messages.publish(message)
    }

    pub fn publish_listing(&self, listing: &PartyFinderListing) -> usize {
        self.listings.publish(listing)
    }

    pub fn message_subscribers(&self) -> usize {
        self.messages.subscriber_count()
    }

    pub fn listing_subscribers(&self) -> usize {
        self.listings.subscriber_count()
    }
}

impl Default for HostEventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEvents for HostEventHub {
    fn subscribe_messages(&self, handler: EventHandler<ChatMessage>) -> Subscription {
        self.messages.subscribe(handler)
    }

    fn subscribe_listings(&self, handler: EventHandler<PartyFinderListing>) -> Subscription {
        self.listings.subscribe(handler)
    }
}
