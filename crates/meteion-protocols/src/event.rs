//! Host events relayed to the webhook endpoint.

use serde::{Deserialize, Serialize};

/// A chat line observed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Chat channel classification (e.g. "Say", "Party", "TellIncoming").
    pub chat_type: String,
    /// Host-assigned sender identifier; 0 for system messages.
    pub sender_id: u32,
    /// Sender display text.
    pub sender: String,
    /// Message text with formatting stripped.
    pub message: String,
}

impl ChatMessage {
    pub fn new(
        chat_type: impl Into<String>,
        sender_id: u32,
        sender: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            chat_type: chat_type.into(),
            sender_id,
            sender: sender.into(),
            message: message.into(),
        }
    }
}

/// A party finder listing received by the host.
///
/// World and duty names come from host lookups that can miss, so they are
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyFinderListing {
    pub id: u32,
    pub current_world: Option<String>,
    pub category: String,
    pub duty_type: String,
    pub duty: Option<String>,
    pub description: String,
    pub seconds_remaining: u16,
    /// Lower 32 bits of the host's content id.
    pub content_id_lower: u32,
    /// Host character name.
    pub name: String,
    pub home_world: Option<String>,
}
