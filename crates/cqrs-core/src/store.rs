//! Event store abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::{AggregateId, Event, RecordedEvent};
use crate::stream::EventStream;

/// Append-only storage of per-aggregate event streams.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Load all events for a given aggregate, ordered by sequence number.
    async fn load(&self, aggregate_id: &AggregateId) -> Result<Vec<Event>, DomainError>;

    /// Append new events to an aggregate stream with optimistic concurrency.
    /// `expected_version` is the sequence number of the last stored event.
    async fn append(
        &self,
        aggregate_id: &AggregateId,
        expected_version: u64,
        events: &[RecordedEvent],
    ) -> Result<(), DomainError>;

    /// Loads and validates the stream of `aggregate_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the stream is empty, and
    /// the errors of [`EventStream::new`] if it is inconsistent.
    async fn load_stream(&self, aggregate_id: &AggregateId) -> Result<EventStream, DomainError> {
        let events = self.load(aggregate_id).await?;
        if events.is_empty() {
            return Err(DomainError::AggregateNotFound(aggregate_id.clone()));
        }
        EventStream::new(aggregate_id.clone(), events)
    }
}
