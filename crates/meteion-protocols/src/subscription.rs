//! Owned event subscriptions.
//!
//! A [`Subscription`] is returned by every subscribe call and releases the
//! handler when dropped, so teardown order is explicit and a handler cannot be
//! removed twice.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

/// Callback invoked for each published event.
pub type EventHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle that keeps an event handler attached until dropped.
#[must_use = "dropping a Subscription immediately unsubscribes the handler"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `release` exactly once when dropped.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the handler now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

struct HubInner<E> {
    handlers: RwLock<Vec<(u64, EventHandler<E>)>>,
    next_id: AtomicU64,
}

impl<E> HubInner<E> {
    fn remove(&self, id: u64) {
        self.handlers.write().retain(|(handler_id, _)| *handler_id != id);
    }
}

/// In-process event source with subscription handles.
///
/// Handlers are cloned out of the list before being invoked, so a handler
/// may subscribe or unsubscribe without deadlocking the hub.
pub struct EventHub<E> {
    name: &'static str,
    inner: Arc<HubInner<E>>,
}

impl<E: 'static> EventHub<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(HubInner {
                handlers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Attach a handler. It stays attached while the returned handle lives.
    pub fn subscribe(&self, handler: EventHandler<E>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.handlers.write().push((id, handler));
        debug!(hub = self.name, id, "Handler subscribed");

        let weak: Weak<HubInner<E>> = Arc::downgrade(&self.inner);
        let name = self.name;
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
                debug!(hub = name, id, "Handler unsubscribed");
            }
        })
    }

    /// Deliver `event` to every attached handler. Returns the number of
    /// handlers invoked.
    pub fn publish(&self, event: &E) -> usize {
        let handlers: Vec<EventHandler<E>> = self
            .inner
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.read().len()
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
