//! Wire envelopes for relayed host events.
//!
//! Every field is optional on the wire and serialized as `null` when absent,
//! so receivers can rely on a fixed key set.

use serde::{Deserialize, Serialize};

use meteion_protocols::{ChatMessage, PartyFinderListing};

/// Chat message as posted to the chat route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChatEntry {
    #[serde(rename = "Type")]
    pub chat_type: Option<String>,
    pub sender_id: Option<u32>,
    pub sender: Option<String>,
    pub message: Option<String>,
}

impl From<&ChatMessage> for ChatEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            chat_type: Some(msg.chat_type.clone()),
            sender_id: Some(msg.sender_id),
            sender: Some(msg.sender.clone()),
            message: Some(msg.message.clone()),
        }
    }
}

/// Host character of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PartyFinderEntryHost {
    pub content_id_lower: Option<u32>,
    pub name: Option<String>,
    pub home_world: Option<String>,
}

/// Party finder listing as posted to the party finder route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PartyFinderEntry {
    #[serde(rename = "ID")]
    pub id: Option<u32>,
    pub current_world: Option<String>,
    pub category: Option<String>,
    pub duty_type: Option<String>,
    pub duty: Option<String>,
    pub description: Option<String>,
    pub seconds_remaining: Option<u16>,
    pub host: Option<PartyFinderEntryHost>,
}

impl From<&PartyFinderListing> for PartyFinderEntry {
    fn from(listing: &PartyFinderListing) -> Self {
        Self {
            id: Some(listing.id),
            current_world: listing.current_world.clone(),
            category: Some(listing.category.clone()),
            duty_type: Some(listing.duty_type.clone()),
            duty: listing.duty.clone(),
            description: Some(listing.description.clone()),
            seconds_remaining: Some(listing.seconds_remaining),
            host: Some(PartyFinderEntryHost {
                content_id_lower: Some(listing.content_id_lower),
                name: Some(listing.name.clone()),
                home_world: listing.home_world.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_chat_entry_field_names() {
        let msg = ChatMessage::new("Say", 42, "Alice", "hello");
        let value = serde_json::to_value(ChatEntry::from(&msg)).unwrap();
        assert_eq!(
            value,
            json!({"Type": "Say", "SenderId": 42, "Sender": "Alice", "Message": "hello"})
        );
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let value = serde_json::to_value(ChatEntry::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.values().all(Value::is_null));

        let value = serde_json::to_value(PartyFinderEntry::default()).unwrap();
        assert_eq!(value["ID"], Value::Null);
        assert_eq!(value["Host"], Value::Null);
    }

    #[test]
    fn test_listing_entry_nests_host() {
        let listing = PartyFinderListing {
            id: 7,
            current_world: Some("Tonberry".to_string()),
            category: "DutyRoulette".to_string(),
            duty_type: "Normal".to_string(),
            duty: None,
            description: "farm".to_string(),
            seconds_remaining: 1200,
            content_id_lower: 123456,
            name: "Bob".to_string(),
            home_world: Some("Ifrit".to_string()),
        };
        let value = serde_json::to_value(PartyFinderEntry::from(&listing)).unwrap();
        assert_eq!(value["ID"], 7);
        assert_eq!(value["CurrentWorld"], "Tonberry");
        assert_eq!(value["Duty"], Value::Null);
        assert_eq!(value["SecondsRemaining"], 1200);
        assert_eq!(
            value["Host"],
            json!({"ContentIdLower": 123456, "Name": "Bob", "HomeWorld": "Ifrit"})
        );
    }

    #[test]
    fn test_partial_entry_deserializes() {
        let entry: PartyFinderEntry = serde_json::from_str(r#"{"ID": 3}"#).unwrap();
        assert_eq!(entry.id, Some(3));
        assert!(entry.host.is_none());
    }
}
