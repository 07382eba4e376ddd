//! Built-in actions bound at startup.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use meteion_protocols::error::ActionError;
use meteion_protocols::host::{HostCapabilities, StatusQuery, WaymarkPlacer};

use crate::chat::ChatGate;
use crate::registry::{ActionHandler, ActionRegistry};

pub const COMMAND: &str = "command";
pub const WAYMARK: &str = "waymark";
pub const PLACE: &str = "place";
pub const QUERY: &str = "query";

/// Text commands must start with this character.
pub const COMMAND_PREFIX: char = '/';
pub const MIN_COMMAND_CHARS: usize = 2;
pub const MAX_COMMAND_CHARS: usize = 399;

/// Response returned after a text command was handed to the host.
pub const EXECUTED: &str = "Executed";

/// Check a text command before it reaches the host.
pub fn validate_text_command(command: &str) -> Result<(), ActionError> {
    let chars = command.chars().count();
    if command.starts_with(COMMAND_PREFIX)
        && (MIN_COMMAND_CHARS..=MAX_COMMAND_CHARS).contains(&chars)
    {
        Ok(())
    } else {
        Err(ActionError::InvalidCommand(command.to_string()))
    }
}

/// The host-backed actions every Meteion instance exposes.
#[derive(Clone)]
pub struct BuiltinActions {
    chat: Arc<ChatGate>,
    status: Arc<dyn StatusQuery>,
    waymarks: Arc<dyn WaymarkPlacer>,
}

impl BuiltinActions {
    pub fn new(
        chat: Arc<ChatGate>,
        status: Arc<dyn StatusQuery>,
        waymarks: Arc<dyn WaymarkPlacer>,
    ) -> Self {
        Self {
            chat,
            status,
            waymarks,
        }
    }

    /// Build from a host bundle, guarding chat with `lock_timeout`.
    pub fn from_host(host: &HostCapabilities, lock_timeout: Duration) -> Self {
        Self::new(
            Arc::new(ChatGate::with_timeout(host.chat.clone(), lock_timeout)),
            host.status.clone(),
            host.waymarks.clone(),
        )
    }

    /// Bind `command`, `waymark`, `place` and `query` into `registry`.
    pub fn install(&self, registry: &ActionRegistry) {
        let chat = self.chat.clone();
        registry.register_fn(COMMAND, move |payload| {
            validate_text_command(payload)?;
            chat.send(payload)?;
            Ok(EXECUTED.to_string())
        });

        let waymarks = self.waymarks.clone();
        let waymark_handler: ActionHandler =
            Arc::new(move |payload: &str| -> Result<String, ActionError> {
                Ok(waymarks.place_waymarks(payload)?)
            });
        registry.register(WAYMARK, waymark_handler.clone());
        registry.register(PLACE, waymark_handler);

        let status = self.status.clone();
        registry.register_fn(QUERY, move |payload| Ok(status.query_status(payload)?));

        debug!(
            lock_timeout_ms = self.chat.timeout().as_millis() as u64,
            "Built-in actions installed"
        );
    }
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
