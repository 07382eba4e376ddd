//! Action registry.
//!
//! Uses `DashMap` so in-flight dispatches can look up handlers concurrently
//! while the rare register/clear calls take a shard write lock.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use meteion_protocols::error::ActionError;

/// Handler bound to an action name: payload in, response text out.
pub type ActionHandler = Arc<dyn Fn(&str) -> Result<String, ActionError> + Send + Sync>;

/// Registry of named actions.
pub struct ActionRegistry {
    actions: DashMap<String, ActionHandler>,
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
        }
    }

    /// Bind `handler` to `name`, replacing any existing binding.
    pub fn register(&self, name: &str, handler: ActionHandler) {
        let key = normalize(name);
        if self.actions.insert(key.clone(), handler).is_some() {
            debug!(action = %key, "Action replaced");
        } else {
            debug!(action = %key, "Action registered");
        }
    }

    /// Bind a closure to `name`.
    pub fn register_fn<F>(&self, name: &str, handler: F)
    where
        F: Fn(&str) -> Result<String, ActionError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(handler));
    }

    /// Remove every binding.
    pub fn clear(&self) {
        let count = self.actions.len();
        self.actions.clear();
        debug!(count, "Actions cleared");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(&normalize(name))
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run the handler bound to `name`.
    ///
    /// A panicking handler is reported as [`ActionError::HandlerFault`].
    pub fn try_dispatch(&self, name: &str, payload: &str) -> Result<String, ActionError> {
        // Clone the handler out so no shard lock is held while it runs.
        let handler = self
            .actions
            .get(&normalize(name))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ActionError::NoSuchAction(name.to_string()))?;

        match panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            Ok(result) => result,
            Err(panic) => Err(ActionError::HandlerFault(format!(
                "action '{}' panicked: {}",
                name,
                panic_message(panic.as_ref())
            ))),
        }
    }

    /// Run the handler bound to `name`, rendering any failure as text.
    pub fn dispatch(&self, name: &str, payload: &str) -> String {
        match self.try_dispatch(name, payload) {
            Ok(response) => response,
            Err(err) => {
                log_failure(name, &err);
                err.to_string()
            }
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a dispatch failure at the level its kind calls for.
pub fn log_failure(action: &str, err: &ActionError) {
    match err {
        ActionError::InvalidCommand(_) => info!(action, kind = err.kind(), "{}", err),
        ActionError::NoSuchAction(_)
        | ActionError::ChatBusy(_)
        | ActionError::MalformedRequest(_) => warn!(action, kind = err.kind(), "{}", err),
        ActionError::HandlerFault(_) | ActionError::Host(_) => {
            error!(action, kind = err.kind(), "{}", err)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
