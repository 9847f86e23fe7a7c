//! Event bus with handler failure isolation.
//!
//! `publish` never fails. A handler error does not stop the remaining
//! handlers; it becomes a [`Fault`] that is published through the same
//! locator. A handler error while publishing a fault is logged and ends
//! that fault's dispatch, so faults never produce further faults.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::event::RecordedEvent;
use crate::handler::HandlerLocator;
use crate::message::{Fault, Message};

/// Dispatches messages to the handlers a [`HandlerLocator`] resolves.
pub struct EventBus<L> {
    locator: L,
    clock: Arc<dyn Clock>,
}

impl<L: HandlerLocator> EventBus<L> {
    /// Creates a bus stamping faults with the system clock.
    #[must_use]
    pub fn new(locator: L) -> Self {
        Self::with_clock(locator, Arc::new(SystemClock))
    }

    /// Creates a bus stamping faults with `clock`.
    #[must_use]
    pub fn with_clock(locator: L, clock: Arc<dyn Clock>) -> Self {
        Self { locator, clock }
    }

    /// The locator handlers are resolved through.
    #[must_use]
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Invokes every handler for `message`, in locator order.
    pub fn publish(&self, message: &Message) {
        let handlers = self.locator.resolve(message);
        debug!(
            message_type = message.message_type(),
            handlers = handlers.len(),
            "dispatching message"
        );

        for handler in handlers {
            let Err(err) = handler.handle(message) else {
                continue;
            };

            match message {
                Message::Fault(fault) => {
                    error!(
                        fault_id = %fault.fault_id(),
                        handler = handler.name(),
                        failed_handler = fault.handler(),
                        error = %err,
                        "fault handler failed; dropping fault"
                    );
                    return;
                }
                Message::Event(recorded) => {
                    warn!(
                        handler = handler.name(),
                        event_id = %recorded.event.event_id(),
                        event_type = %recorded.event.event_type(),
                        error = %err,
                        "event handler failed; publishing fault"
                    );
                    let fault =
                        Fault::new(recorded.clone(), handler.name(), err, self.clock.as_ref());
                    self.publish(&Message::Fault(fault));
                }
            }
        }
    }

    /// Publishes one recorded event.
    pub fn publish_event(&self, recorded: RecordedEvent) {
        self.publish(&Message::Event(recorded));
    }

    /// Publishes events one after another, in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = RecordedEvent>) {
        for recorded in events {
            self.publish_event(recorded);
        }
    }
}

impl<L: fmt::Debug> fmt::Debug for EventBus<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}
