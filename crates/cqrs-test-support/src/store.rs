//! Test event stores — in-memory `EventStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cqrs_core::error::DomainError;
use cqrs_core::event::{AggregateId, Event, RecordedEvent};
use cqrs_core::store::EventStore;

type AppendCall = (AggregateId, u64, Vec<RecordedEvent>);

/// An event store that keeps streams in memory, enforces optimistic
/// concurrency on append, and records every successful `append` call.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: Mutex<HashMap<AggregateId, Vec<Event>>>,
    appended: Mutex<Vec<AppendCall>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `events` for `aggregate_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_stream(aggregate_id: AggregateId, events: Vec<Event>) -> Self {
        let store = Self::new();
        store.streams.lock().unwrap().insert(aggregate_id, events);
        store
    }

    /// Returns a snapshot of all successful `append` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended(&self) -> Vec<AppendCall> {
        self.appended.lock().unwrap().clone()
    }

    /// Returns a snapshot of the stored stream for `aggregate_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stream(&self, aggregate_id: &AggregateId) -> Vec<Event> {
        self.streams
            .lock()
            .unwrap()
            .get(aggregate_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn load(&self, aggregate_id: &AggregateId) -> Result<Vec<Event>, DomainError> {
        Ok(self.stream(aggregate_id))
    }

    async fn append(
        &self,
        aggregate_id: &AggregateId,
        expected_version: u64,
        events: &[RecordedEvent],
    ) -> Result<(), DomainError> {
        if let Some(foreign) = events
            .iter()
            .find(|recorded| recorded.event.aggregate_id() != Some(aggregate_id))
        {
            return Err(DomainError::AggregateIdentifierMismatch {
                expected: aggregate_id.clone(),
                actual: foreign.event.aggregate_id().cloned(),
            });
        }

        let mut streams = self.streams.lock().unwrap();
        let stream = streams.entry(aggregate_id.clone()).or_default();
        let actual = stream.len() as u64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id: aggregate_id.clone(),
                expected: expected_version,
                actual,
            });
        }
        stream.extend(events.iter().map(|recorded| recorded.event.clone()));

        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id.clone(), expected_version, events.to_vec()));
        Ok(())
    }
}

/// An event store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn load(&self, _aggregate_id: &AggregateId) -> Result<Vec<Event>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append(
        &self,
        _aggregate_id: &AggregateId,
        _expected_version: u64,
        _events: &[RecordedEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use cqrs_core::event_type::EventType;

    use super::*;
    use crate::FixedClock;

    fn recorded(id: &str, sequence: u64) -> RecordedEvent {
        Event::new(
            EventType::new("test.Happened"),
            serde_json::Value::Null,
            &FixedClock::default(),
        )
        .with_aggregate_id(AggregateId::new(id))
        .unwrap()
        .with_sequence_number(sequence)
        .unwrap()
        .into()
    }

    #[tokio::test]
    async fn test_append_then_load_preserves_order() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new("A1");
        let batch = vec![recorded("A1", 1), recorded("A1", 2)];

        store.append(&id, 0, &batch).await.unwrap();
        let loaded = store.load(&id).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].sequence_number(), Some(1));
        assert_eq!(loaded[1].sequence_number(), Some(2));
        assert_eq!(store.appended().len(), 1);
    }

    #[tokio::test]
    async fn test_append_with_stale_version_conflicts() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new("A1");
        store.append(&id, 0, &[recorded("A1", 1)]).await.unwrap();

        let result = store.append(&id, 0, &[recorded("A1", 1)]).await;

        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict {
                expected: 0,
                actual: 1,
                ..
            })
        ));
        assert_eq!(store.stream(&id).len(), 1);
    }

    #[tokio::test]
    async fn test_append_rejects_foreign_events() {
        let store = InMemoryEventStore::new();

        let result = store
            .append(&AggregateId::new("A1"), 0, &[recorded("B2", 1)])
            .await;

        assert!(matches!(
            result,
            Err(DomainError::AggregateIdentifierMismatch { .. })
        ));
        assert!(store.appended().is_empty());
    }

    #[tokio::test]
    async fn test_failing_store_fails_both_operations() {
        let id = AggregateId::new("A1");

        assert!(FailingEventStore.load(&id).await.is_err());
        assert!(FailingEventStore.append(&id, 0, &[]).await.is_err());
    }
}
