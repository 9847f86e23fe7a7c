//! Dispatch envelopes: events and the faults synthesized from handler failures.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::DomainError;
use crate::event::{AggregateId, RecordedEvent};

/// Message type of every [`Fault`], and the key faults are resolved on.
///
/// Event handler keys are bare short names and never contain a namespace
/// separator, so no event type, `billing.Fault` included, resolves to the
/// fault handlers.
pub const FAULT_TYPE: &str = "cqrs.Fault";

/// Failure reported by an event handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        Self::new(err.to_string())
    }
}

/// A handler's failure while processing an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    fault_id: Uuid,
    event: RecordedEvent,
    handler: String,
    error: HandlerError,
    occurred_at: DateTime<Utc>,
}

impl Fault {
    /// Wraps the failing event, the handler that failed and its error.
    #[must_use]
    pub fn new(
        event: RecordedEvent,
        handler: impl Into<String>,
        error: HandlerError,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            fault_id: Uuid::new_v4(),
            event,
            handler: handler.into(),
            error,
            occurred_at: clock.now(),
        }
    }

    /// Unique fault identifier.
    #[must_use]
    pub fn fault_id(&self) -> Uuid {
        self.fault_id
    }

    /// The event whose handling failed.
    #[must_use]
    pub fn event(&self) -> &RecordedEvent {
        &self.event
    }

    /// Name of the handler that failed.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// The captured error.
    #[must_use]
    pub fn error(&self) -> &HandlerError {
        &self.error
    }

    /// When the failure was captured.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Anything the event bus dispatches.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A domain event with its recording metadata.
    Event(RecordedEvent),
    /// A handler failure. Failures while handling a fault are never turned
    /// into further faults.
    Fault(Fault),
}

impl Message {
    /// Full type name: the event type, or [`FAULT_TYPE`].
    #[must_use]
    pub fn message_type(&self) -> &str {
        match self {
            Self::Event(recorded) => recorded.event.event_type().as_str(),
            Self::Fault(_) => FAULT_TYPE,
        }
    }

    /// The key handler locators resolve this message on: the event's
    /// handler key, or [`FAULT_TYPE`] for faults.
    #[must_use]
    pub fn handler_key(&self) -> String {
        match self {
            Self::Event(recorded) => recorded.event.event_type().handler_key(),
            Self::Fault(_) => FAULT_TYPE.to_owned(),
        }
    }

    /// Returns `true` for faults.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// The aggregate the underlying event belongs to.
    #[must_use]
    pub fn aggregate_id(&self) -> Option<&AggregateId> {
        match self {
            Self::Event(recorded) => recorded.event.aggregate_id(),
            Self::Fault(fault) => fault.event.event.aggregate_id(),
        }
    }
}

impl From<RecordedEvent> for Message {
    fn from(recorded: RecordedEvent) -> Self {
        Self::Event(recorded)
    }
}

impl From<Fault> for Message {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}
