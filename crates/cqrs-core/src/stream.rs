//! Validated event history for a single aggregate.

use std::collections::HashSet;

use crate::error::DomainError;
use crate::event::{AggregateId, Event, RecordedEvent};

/// An ordered, gap-free sequence of committed events for one aggregate.
///
/// Construction fails if any event belongs to a different aggregate, if the
/// sequence numbers do not run 1, 2, 3, ... in order, or if an event appears
/// twice. Events without a sequence number are accepted at whatever position
/// they appear.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    aggregate_id: AggregateId,
    events: Vec<Event>,
}

impl EventStream {
    /// Validates `events` as the history of `aggregate_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateIdentifierMismatch` if an event carries
    /// another identifier or none, `DomainError::OutOfSequence` if a
    /// sequence number is skipped or repeated, and
    /// `DomainError::DuplicateEvent` if an event ID appears twice.
    pub fn new(aggregate_id: AggregateId, events: Vec<Event>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(events.len());
        for (expected, event) in (1_u64..).zip(&events) {
            if event.aggregate_id() != Some(&aggregate_id) {
                return Err(DomainError::AggregateIdentifierMismatch {
                    expected: aggregate_id,
                    actual: event.aggregate_id().cloned(),
                });
            }
            match event.sequence_number() {
                Some(actual) if actual != expected => {
                    return Err(DomainError::OutOfSequence {
                        aggregate_id,
                        expected,
                        actual,
                    });
                }
                _ => {}
            }
            if !seen.insert(event.event_id()) {
                return Err(DomainError::DuplicateEvent {
                    aggregate_id,
                    event_id: event.event_id(),
                });
            }
        }
        Ok(Self {
            aggregate_id,
            events,
        })
    }

    /// Validates the events of a pulled batch as a complete history.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`EventStream::new`].
    pub fn from_recorded(
        aggregate_id: AggregateId,
        recorded: impl IntoIterator<Item = RecordedEvent>,
    ) -> Result<Self, DomainError> {
        Self::new(aggregate_id, recorded.into_iter().map(|r| r.event).collect())
    }

    /// The aggregate this stream belongs to.
    #[must_use]
    pub fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    /// The events, in sequence order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the stream holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Splits the stream into its identifier and events.
    #[must_use]
    pub fn into_parts(self) -> (AggregateId, Vec<Event>) {
        (self.aggregate_id, self.events)
    }
}
