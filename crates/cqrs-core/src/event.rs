//! Domain event abstractions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::DomainError;
use crate::event_type::EventType;

/// Metadata key holding the correlation ID.
pub const CORRELATION_ID: &str = "correlation_id";
/// Metadata key holding the causation ID.
pub const CAUSATION_ID: &str = "causation_id";

/// Identifier of an aggregate and of its event stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A payload type that knows the name of the event carrying it.
pub trait EventPayload: Serialize + DeserializeOwned {
    /// Full event type name, e.g. `catalog.ItemCreated`.
    const EVENT_TYPE: &'static str;
}

/// A domain occurrence.
///
/// Everything except the owning aggregate and the stream position is fixed
/// at creation. Both of those are set at most once, usually by the aggregate
/// recording the event; a conflicting reassignment is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    event_id: Uuid,
    event_type: EventType,
    aggregate_id: Option<AggregateId>,
    sequence_number: Option<u64>,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event not yet owned by any aggregate.
    #[must_use]
    pub fn new(event_type: EventType, payload: serde_json::Value, clock: &dyn Clock) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            aggregate_id: None,
            sequence_number: None,
            payload,
            occurred_at: clock.now(),
        }
    }

    /// Creates an event from a typed payload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Payload` if the payload cannot be serialized.
    pub fn from_payload<P: EventPayload>(
        payload: &P,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let value = serde_json::to_value(payload).map_err(|source| DomainError::Payload {
            event_type: P::EVENT_TYPE.to_owned(),
            source,
        })?;
        Ok(Self::new(EventType::new(P::EVENT_TYPE), value, clock))
    }

    /// Sets the owning aggregate, under the same set-once rule as
    /// [`Event::assign_aggregate_id`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateIdentifierMismatch` if the event
    /// already belongs to another aggregate.
    pub fn with_aggregate_id(mut self, aggregate_id: AggregateId) -> Result<Self, DomainError> {
        self.assign_aggregate_id(&aggregate_id)?;
        Ok(self)
    }

    /// Sets the stream position, under the same set-once rule as
    /// [`Event::assign_sequence_number`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SequenceNumberConflict` if the event already
    /// holds another position.
    pub fn with_sequence_number(mut self, sequence_number: u64) -> Result<Self, DomainError> {
        self.assign_sequence_number(sequence_number)?;
        Ok(self)
    }

    /// Unique event identifier.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Type name used for apply and handler lookup.
    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The owning aggregate, once assigned.
    #[must_use]
    pub fn aggregate_id(&self) -> Option<&AggregateId> {
        self.aggregate_id.as_ref()
    }

    /// 1-based position in the aggregate stream, once assigned.
    #[must_use]
    pub fn sequence_number(&self) -> Option<u64> {
        self.sequence_number
    }

    /// Raw event payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Timestamp of event creation.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Decodes the payload into its typed form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Payload` if the payload does not match `P`.
    pub fn decode<P: EventPayload>(&self) -> Result<P, DomainError> {
        P::deserialize(&self.payload).map_err(|source| DomainError::Payload {
            event_type: self.event_type.to_string(),
            source,
        })
    }

    /// Assigns the owning aggregate. Assigning the same identifier twice is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateIdentifierMismatch` if the event
    /// already belongs to another aggregate.
    pub fn assign_aggregate_id(&mut self, aggregate_id: &AggregateId) -> Result<(), DomainError> {
        match &self.aggregate_id {
            Some(existing) if existing != aggregate_id => {
                Err(DomainError::AggregateIdentifierMismatch {
                    expected: aggregate_id.clone(),
                    actual: Some(existing.clone()),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.aggregate_id = Some(aggregate_id.clone());
                Ok(())
            }
        }
    }

    /// Assigns the stream position. Assigning the same position twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SequenceNumberConflict` if the event already
    /// holds another position.
    pub fn assign_sequence_number(&mut self, sequence_number: u64) -> Result<(), DomainError> {
        match self.sequence_number {
            Some(assigned) if assigned != sequence_number => {
                Err(DomainError::SequenceNumberConflict {
                    event_id: self.event_id,
                    assigned,
                    requested: sequence_number,
                })
            }
            Some(_) => Ok(()),
            None => {
                self.sequence_number = Some(sequence_number);
                Ok(())
            }
        }
    }
}

/// Correlation/causation data attached to an event when it is recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageMetadata(BTreeMap<String, serde_json::Value>);

impl MessageMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying the same correlation and causation ID.
    #[must_use]
    pub fn correlated(correlation_id: Uuid) -> Self {
        Self::new()
            .with(CORRELATION_ID, correlation_id.to_string())
            .with(CAUSATION_ID, correlation_id.to_string())
    }

    /// Adds or replaces a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// The correlation ID, if present and well formed.
    #[must_use]
    pub fn correlation_id(&self) -> Option<Uuid> {
        self.uuid(CORRELATION_ID)
    }

    /// The causation ID, if present and well formed.
    #[must_use]
    pub fn causation_id(&self) -> Option<Uuid> {
        self.uuid(CAUSATION_ID)
    }

    /// Returns `true` if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn uuid(&self, key: &str) -> Option<Uuid> {
        self.get(key)?.as_str()?.parse().ok()
    }
}

impl FromIterator<(String, serde_json::Value)> for MessageMetadata {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An event paired with the metadata it was recorded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// The recorded event.
    pub event: Event,
    /// Metadata supplied at recording time.
    pub metadata: MessageMetadata,
}

impl RecordedEvent {
    /// Pairs an event with its metadata.
    #[must_use]
    pub fn new(event: Event, metadata: MessageMetadata) -> Self {
        Self { event, metadata }
    }
}

impl From<Event> for RecordedEvent {
    fn from(event: Event) -> Self {
        Self::new(event, MessageMetadata::new())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct At(DateTime<Utc>);

    impl Clock for At {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Created {
        name: String,
    }

    impl EventPayload for Created {
        const EVENT_TYPE: &'static str = "test.Created";
    }

    fn clock() -> At {
        At(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_from_payload_sets_type_and_timestamp() {
        // Arrange
        let clock = clock();

        // Act
        let event = Event::from_payload(&Created { name: "x".into() }, &clock).unwrap();

        // Assert
        assert_eq!(event.event_type().as_str(), "test.Created");
        assert_eq!(event.payload(), &serde_json::json!({ "name": "x" }));
        assert_eq!(event.occurred_at(), clock.0);
        assert_eq!(event.aggregate_id(), None);
        assert_eq!(event.sequence_number(), None);
    }

    #[test]
    fn test_decode_returns_typed_payload() {
        let event = Event::from_payload(&Created { name: "x".into() }, &clock()).unwrap();

        let payload: Created = event.decode().unwrap();

        assert_eq!(payload, Created { name: "x".into() });
    }

    #[test]
    fn test_decode_rejects_mismatched_payload() {
        let event = Event::new(EventType::new("test.Created"), serde_json::json!(42), &clock());

        let result = event.decode::<Created>();

        assert!(matches!(
            result,
            Err(DomainError::Payload { event_type, .. }) if event_type == "test.Created"
        ));
    }

    fn unowned() -> Event {
        Event::new(EventType::new("test.Created"), serde_json::Value::Null, &clock())
    }

    #[test]
    fn test_assign_aggregate_id_sets_identifier_once() {
        let mut event = unowned();
        let id = AggregateId::new("A1");

        event.assign_aggregate_id(&id).unwrap();
        event.assign_aggregate_id(&id).unwrap();

        assert_eq!(event.aggregate_id(), Some(&id));
    }

    #[test]
    fn test_assign_aggregate_id_rejects_conflicting_identifier() {
        let mut event = unowned().with_aggregate_id(AggregateId::new("B2")).unwrap();

        let result = event.assign_aggregate_id(&AggregateId::new("A1"));

        match result {
            Err(DomainError::AggregateIdentifierMismatch { expected, actual }) => {
                assert_eq!(expected.as_str(), "A1");
                assert_eq!(actual, Some(AggregateId::new("B2")));
            }
            other => panic!("expected AggregateIdentifierMismatch, got {other:?}"),
        }
        assert_eq!(event.aggregate_id(), Some(&AggregateId::new("B2")));
    }

    #[test]
    fn test_owned_event_cannot_be_moved_to_another_aggregate() {
        // Arrange
        let owned = unowned().with_aggregate_id(AggregateId::new("A1")).unwrap();

        // Act
        let same = owned.clone().with_aggregate_id(AggregateId::new("A1"));
        let moved = owned.clone().with_aggregate_id(AggregateId::new("B2"));

        // Assert
        assert_eq!(same.unwrap().aggregate_id(), Some(&AggregateId::new("A1")));
        assert!(matches!(
            moved,
            Err(DomainError::AggregateIdentifierMismatch { .. })
        ));
    }

    #[test]
    fn test_assign_sequence_number_sets_position_once() {
        let mut event = unowned().with_sequence_number(3).unwrap();

        event.assign_sequence_number(3).unwrap();
        let result = event.assign_sequence_number(4);

        match result {
            Err(DomainError::SequenceNumberConflict {
                assigned,
                requested,
                event_id,
            }) => {
                assert_eq!(assigned, 3);
                assert_eq!(requested, 4);
                assert_eq!(event_id, event.event_id());
            }
            other => panic!("expected SequenceNumberConflict, got {other:?}"),
        }
        assert_eq!(event.sequence_number(), Some(3));
    }

    #[test]
    fn test_metadata_collects_from_pairs() {
        let metadata: MessageMetadata = [
            ("user".to_owned(), serde_json::json!("alice")),
            (CAUSATION_ID.to_owned(), serde_json::json!("not-a-uuid")),
        ]
        .into_iter()
        .collect();

        assert_eq!(metadata.get("user"), Some(&serde_json::json!("alice")));
        assert_eq!(metadata.causation_id(), None);
        assert_eq!(
            metadata,
            MessageMetadata::new()
                .with("user", "alice")
                .with(CAUSATION_ID, "not-a-uuid")
        );
    }

    #[test]
    fn test_correlated_metadata_carries_both_ids() {
        let correlation_id = Uuid::new_v4();

        let metadata = MessageMetadata::correlated(correlation_id);

        assert_eq!(metadata.correlation_id(), Some(correlation_id));
        assert_eq!(metadata.causation_id(), Some(correlation_id));
    }

    #[test]
    fn test_metadata_ignores_malformed_correlation_id() {
        let metadata = MessageMetadata::new().with(CORRELATION_ID, "not-a-uuid");

        assert_eq!(metadata.correlation_id(), None);
        assert!(!metadata.is_empty());
    }
}
