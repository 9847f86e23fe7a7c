//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::event::AggregateId;

/// Top-level domain error type.
///
/// Aggregate-level variants are local invariant violations and surface
/// synchronously to the caller of the aggregate operation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Reconstitution was attempted on an aggregate that already holds
    /// uncommitted events, has been reconstituted before, or carries a
    /// different identifier.
    #[error("aggregate {aggregate_id} is already reconstituted")]
    AlreadyReconstituted {
        /// The aggregate that rejected the replay.
        aggregate_id: AggregateId,
    },

    /// No apply handler is registered for an event type (strict policy only).
    #[error("aggregate {aggregate_type} has no method '{method}' for event '{event_type}'")]
    MissingEventHandler {
        /// The aggregate type that was asked to apply the event.
        aggregate_type: &'static str,
        /// The full event type name.
        event_type: String,
        /// The apply-method name derived from the event type.
        method: String,
    },

    /// An event carries an identifier other than the aggregate's own, or a
    /// replayed event carries no identifier at all.
    #[error("aggregate identifier mismatch: expected {expected}, found {}", .actual.as_ref().map_or("<none>", AggregateId::as_str))]
    AggregateIdentifierMismatch {
        /// The identifier of the aggregate or stream.
        expected: AggregateId,
        /// The identifier found on the event.
        actual: Option<AggregateId>,
    },

    /// A replayed stream skips or repeats a sequence number.
    #[error("event stream for {aggregate_id} out of sequence: expected {expected}, found {actual}")]
    OutOfSequence {
        /// The stream that is out of sequence.
        aggregate_id: AggregateId,
        /// The sequence number that should come next.
        expected: u64,
        /// The sequence number found.
        actual: u64,
    },

    /// A replayed stream lists the same event more than once.
    #[error("event stream for {aggregate_id} contains event {event_id} more than once")]
    DuplicateEvent {
        /// The stream holding the duplicate.
        aggregate_id: AggregateId,
        /// The repeated event.
        event_id: Uuid,
    },

    /// An event already holding a stream position was given a different one.
    #[error("event {event_id} already has sequence number {assigned}, cannot assign {requested}")]
    SequenceNumberConflict {
        /// The event whose position is fixed.
        event_id: Uuid,
        /// The position the event already holds.
        assigned: u64,
        /// The position that was refused.
        requested: u64,
    },

    /// An event was recorded on an aggregate that has no identifier yet.
    #[error("aggregate {0} has no identifier; construct it or reconstitute it first")]
    Uninitialized(&'static str),

    /// An event payload could not be encoded or decoded.
    #[error("payload error for event '{event_type}': {source}")]
    Payload {
        /// The event type whose payload failed.
        event_type: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: AggregateId,
        /// The expected version.
        expected: u64,
        /// The actual version found.
        actual: u64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_mismatch_message_names_both_identifiers() {
        let err = DomainError::AggregateIdentifierMismatch {
            expected: AggregateId::new("A1"),
            actual: Some(AggregateId::new("B2")),
        };

        assert_eq!(
            err.to_string(),
            "aggregate identifier mismatch: expected A1, found B2"
        );
    }

    #[test]
    fn test_identifier_mismatch_message_without_actual_identifier() {
        let err = DomainError::AggregateIdentifierMismatch {
            expected: AggregateId::new("A1"),
            actual: None,
        };

        assert_eq!(
            err.to_string(),
            "aggregate identifier mismatch: expected A1, found <none>"
        );
    }

    #[test]
    fn test_sequence_number_conflict_message_names_both_positions() {
        let err = DomainError::SequenceNumberConflict {
            event_id: Uuid::nil(),
            assigned: 7,
            requested: 1,
        };

        assert_eq!(
            err.to_string(),
            "event 00000000-0000-0000-0000-000000000000 already has sequence number 7, cannot assign 1"
        );
    }

    #[test]
    fn test_missing_event_handler_message_names_method() {
        let err = DomainError::MissingEventHandler {
            aggregate_type: "catalog_item",
            event_type: "catalog.ItemArchived".to_owned(),
            method: "applyItemArchived".to_owned(),
        };

        assert_eq!(
            err.to_string(),
            "aggregate catalog_item has no method 'applyItemArchived' for event 'catalog.ItemArchived'"
        );
    }
}
