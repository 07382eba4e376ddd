//! Headless console host.
//!
//! Stands in for a real host application: chat goes to stdout, stdin lines
//! come back as chat events.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use meteion_protocols::{
    ChatMessage, ChatSender, HostCapabilities, HostError, HostEventHub, StatusQuery,
    WaymarkPlacer,
};

/// Chat type of events read from stdin.
pub const CONSOLE_CHAT_TYPE: &str = "Echo";
pub const CONSOLE_SENDER: &str = "console";

pub struct ConsoleHost {
    started: Instant,
    last_command: Mutex<Option<String>>,
    events: Arc<HostEventHub>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            started: Instant::now(),
            last_command: Mutex::new(None),
            events: Arc::new(HostEventHub::new()),
            out: Mutex::new(out),
        }
    }

    pub fn events(&self) -> &Arc<HostEventHub> {
        &self.events
    }

    pub fn capabilities(self: &Arc<Self>) -> HostCapabilities {
        HostCapabilities {
            chat: self.clone(),
            status: self.clone(),
            waymarks: self.clone(),
            events: self.events.clone(),
        }
    }

    /// Publish every stdin line as a chat event from a plain thread.
    ///
    /// The thread ends at EOF; it is never joined.
    pub fn spawn_stdin_reader(&self) -> io::Result<()> {
        let events = self.events.clone();
        thread::Builder::new()
            .name("meteion-stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) if line.trim().is_empty() => {}
                        Ok(line) => {
                            let msg = ChatMessage::new(CONSOLE_CHAT_TYPE, 0, CONSOLE_SENDER, line);
                            let delivered = events.publish_message(&msg);
                            debug!(delivered, "Console line published");
                        }
                        Err(e) => {
                            warn!(error = %e, "Stopped reading stdin");
                            break;
                        }
                    }
                }
            })?;
        Ok(())
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSender for ConsoleHost {
    fn send_chat(&self, text: &str) -> Result<(), HostError> {
        {
            let mut out = self.out.lock();
            writeln!(out, "{}", text)
                .and_then(|_| out.flush())
                .map_err(|e| HostError::Failed(e.to_string()))?;
        }
        *self.last_command.lock() = Some(text.to_string());
        Ok(())
    }
}

impl StatusQuery for ConsoleHost {
    fn query_status(&self, payload: &str) -> Result<String, HostError> {
        let last_command = self.last_command.lock().clone();
        let status = json!({
            "host": "console",
            "query": payload,
            "uptime_seconds": self.started.elapsed().as_secs(),
            "last_command": last_command,
        });
        Ok(status.to_string())
    }
}

impl WaymarkPlacer for ConsoleHost {
    fn place_waymarks(&self, payload: &str) -> Result<String, HostError> {
        let preset: Value = serde_json::from_str(payload)
            .map_err(|e| HostError::InvalidPayload(format!("waymark preset is not JSON: {}", e)))?;

        let count = match &preset {
            Value::Object(marks) => marks.len(),
            Value::Array(marks) => marks.len(),
            _ => {
                return Err(HostError::InvalidPayload(
                    "waymark preset must be an object or an array".to_string(),
                ));
            }
        };
        Ok(format!("Placed {} waymarks", count))
    }
}
