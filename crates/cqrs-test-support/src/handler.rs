//! Test handlers — `EventHandler` implementations that record or fail.

use std::sync::Mutex;

use cqrs_core::handler::EventHandler;
use cqrs_core::message::{Fault, HandlerError, Message};

/// A handler that records every message it receives and always succeeds.
#[derive(Debug)]
pub struct RecordingHandler {
    name: String,
    received: Mutex<Vec<Message>>,
}

impl RecordingHandler {
    /// Creates a recording handler identified by `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every message received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn received(&self) -> Vec<Message> {
        self.received.lock().unwrap().clone()
    }

    /// Returns a snapshot of the faults received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn faults(&self) -> Vec<Fault> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter_map(|message| match message {
                Message::Fault(fault) => Some(fault.clone()),
                Message::Event(_) => None,
            })
            .collect()
    }

    /// Returns the message types received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn message_types(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.message_type().to_owned())
            .collect()
    }
}

impl EventHandler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        self.received.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A handler that counts its invocations and always fails with the
/// configured error message.
#[derive(Debug)]
pub struct FailingHandler {
    name: String,
    error: String,
    calls: Mutex<usize>,
}

impl FailingHandler {
    /// Creates a failing handler identified by `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            calls: Mutex::new(0),
        }
    }

    /// Number of times `handle` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl EventHandler for FailingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, _message: &Message) -> Result<(), HandlerError> {
        *self.calls.lock().unwrap() += 1;
        Err(HandlerError::new(self.error.clone()))
    }
}
