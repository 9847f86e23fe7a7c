//! Event handler and handler locator abstractions.

use std::sync::Arc;

use tracing::warn;

use crate::message::{HandlerError, Message};

/// Something interested in dispatched messages.
///
/// Handlers are shared across concurrent `publish` calls; stateful handlers
/// keep their state behind interior mutability.
pub trait EventHandler: Send + Sync {
    /// Identity of the handler, recorded on faults it causes.
    fn name(&self) -> &str;

    /// Handles one message.
    ///
    /// # Errors
    ///
    /// Any error is converted into a fault by the event bus.
    fn handle(&self, message: &Message) -> Result<(), HandlerError>;
}

/// Lookup from a message to the handlers interested in it.
pub trait HandlerLocator: Send + Sync {
    /// Handlers for `message`, in invocation order.
    fn resolve(&self, message: &Message) -> Vec<Arc<dyn EventHandler>>;
}

impl<L: HandlerLocator + ?Sized> HandlerLocator for Arc<L> {
    fn resolve(&self, message: &Message) -> Vec<Arc<dyn EventHandler>> {
        (**self).resolve(message)
    }
}

/// Fault handler that reports faults through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFaultHandler;

impl EventHandler for LoggingFaultHandler {
    fn name(&self) -> &str {
        "logging_fault_handler"
    }

    fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        if let Message::Fault(fault) = message {
            let event = &fault.event().event;
            warn!(
                fault_id = %fault.fault_id(),
                handler = fault.handler(),
                event_id = %event.event_id(),
                event_type = %event.event_type(),
                aggregate_id = event.aggregate_id().map(|id| id.as_str()),
                error = %fault.error(),
                "event handler failed"
            );
        }
        Ok(())
    }
}
