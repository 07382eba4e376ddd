//! Serialized access to the host chat sender.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use meteion_protocols::error::ActionError;
use meteion_protocols::host::ChatSender;

/// Default time a caller waits for another send to finish.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Allows at most one outstanding chat send at a time.
///
/// Concurrent sends through the host would interleave output. Waiters give up
/// after the configured timeout instead of blocking forever.
pub struct ChatGate {
    sender: Arc<dyn ChatSender>,
    lock: Mutex<()>,
    timeout: Duration,
}

impl ChatGate {
    pub fn new(sender: Arc<dyn ChatSender>) -> Self {
        Self::with_timeout(sender, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(sender: Arc<dyn ChatSender>, timeout: Duration) -> Self {
        Self {
            sender,
            lock: Mutex::new(()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `text` through the host while holding the gate.
    pub fn send(&self, text: &str) -> Result<(), ActionError> {
        let _guard = self.lock.try_lock_for(self.timeout).ok_or_else(|| {
            ActionError::ChatBusy(format!(
                "previous send still running after {}ms",
                self.timeout.as_millis()
            ))
        })?;

        info!(command = text, "Executed text command");
        self.sender.send_chat(text)?;
        Ok(())
    }
}
