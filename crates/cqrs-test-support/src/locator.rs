//! Test locator — a `HandlerLocator` backed by an explicit subscription table.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cqrs_core::event::EventPayload;
use cqrs_core::event_type;
use cqrs_core::handler::{EventHandler, HandlerLocator};
use cqrs_core::message::{FAULT_TYPE, Message};

/// A locator resolving handlers by handler key, in subscription order.
#[derive(Default)]
pub struct RegistryLocator {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl RegistryLocator {
    /// Creates a locator with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to every message whose type maps to the same
    /// handler key as `message_type`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn subscribe(&self, message_type: &str, handler: Arc<dyn EventHandler>) {
        self.subscribe_key(event_type::handler_key(message_type), handler);
    }

    /// Subscribes `handler` to events carrying payload `P`.
    pub fn subscribe_to<P: EventPayload>(&self, handler: Arc<dyn EventHandler>) {
        self.subscribe(P::EVENT_TYPE, handler);
    }

    /// Subscribes `handler` to faults.
    pub fn subscribe_faults(&self, handler: Arc<dyn EventHandler>) {
        self.subscribe_key(FAULT_TYPE.to_owned(), handler);
    }

    fn subscribe_key(&self, key: String, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap()
            .entry(key)
            .or_default()
            .push(handler);
    }
}

impl HandlerLocator for RegistryLocator {
    fn resolve(&self, message: &Message) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap()
            .get(&message.handler_key())
            .cloned()
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for RegistryLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self
            .handlers
            .read()
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("RegistryLocator").field("keys", &keys).finish()
    }
}
