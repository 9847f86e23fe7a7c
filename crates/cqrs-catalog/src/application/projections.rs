//! Read-model projections fed by the event bus.

use std::collections::BTreeMap;
use std::sync::RwLock;

use cqrs_core::event::{AggregateId, EventPayload, RecordedEvent};
use cqrs_core::handler::EventHandler;
use cqrs_core::message::{HandlerError, Message};
use tracing::debug;

use crate::domain::events::{ItemCreated, ItemDiscontinued, ItemRenamed};

/// Listing of active items by name, kept current from catalog events.
#[derive(Debug, Default)]
pub struct ItemNameIndex {
    names: RwLock<BTreeMap<AggregateId, String>>,
}

impl ItemNameIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Event types this projection must be subscribed to.
    #[must_use]
    pub fn event_types() -> [&'static str; 3] {
        [
            ItemCreated::EVENT_TYPE,
            ItemRenamed::EVENT_TYPE,
            ItemDiscontinued::EVENT_TYPE,
        ]
    }

    /// Current name of an active item.
    #[must_use]
    pub fn name_of(&self, item_id: &AggregateId) -> Option<String> {
        self.names.read().ok()?.get(item_id).cloned()
    }

    /// Number of active items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.read().map_or(0, |names| names.len())
    }

    /// Returns `true` if no active item is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn project(&self, recorded: &RecordedEvent) -> Result<(), HandlerError> {
        let event = &recorded.event;
        let item_id = event.aggregate_id().cloned().ok_or_else(|| {
            HandlerError::new(format!("event {} has no aggregate", event.event_id()))
        })?;
        let mut names = self
            .names
            .write()
            .map_err(|_| HandlerError::new("item name index lock poisoned"))?;

        match event.event_type().as_str() {
            t if t == ItemCreated::EVENT_TYPE => {
                let payload: ItemCreated = event.decode()?;
                names.insert(item_id, payload.name);
            }
            t if t == ItemRenamed::EVENT_TYPE => {
                let payload: ItemRenamed = event.decode()?;
                names.insert(item_id, payload.name);
            }
            t if t == ItemDiscontinued::EVENT_TYPE => {
                names.remove(&item_id);
            }
            other => debug!(event_type = other, "item name index ignores event"),
        }
        Ok(())
    }
}

impl EventHandler for ItemNameIndex {
    fn name(&self) -> &str {
        "catalog.item_name_index"
    }

    fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        match message {
            Message::Event(recorded) => self.project(recorded),
            Message::Fault(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqrs_core::event::{Event, MessageMetadata};
    use cqrs_core::event_type::EventType;
    use cqrs_test_support::FixedClock;

    fn recorded<P: EventPayload>(id: &str, payload: &P) -> Message {
        let event = Event::from_payload(payload, &FixedClock::default())
            .unwrap()
            .with_aggregate_id(AggregateId::new(id))
            .unwrap();
        Message::Event(RecordedEvent::new(event, MessageMetadata::new()))
    }

    #[test]
    fn test_index_follows_create_rename_and_discontinue() {
        // Arrange
        let index = ItemNameIndex::new();
        let id = AggregateId::new("A1");

        // Act / Assert
        index
            .handle(&recorded(
                "A1",
                &ItemCreated {
                    sku: "SKU-1".into(),
                    name: "Lamp".into(),
                    price_cents: 1999,
                },
            ))
            .unwrap();
        assert_eq!(index.name_of(&id).as_deref(), Some("Lamp"));

        index
            .handle(&recorded("A1", &ItemRenamed { name: "Desk Lamp".into() }))
            .unwrap();
        assert_eq!(index.name_of(&id).as_deref(), Some("Desk Lamp"));

        index
            .handle(&recorded("A1", &ItemDiscontinued { reason: "recalled".into() }))
            .unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_reports_malformed_payload() {
        let index = ItemNameIndex::new();
        let event = Event::new(
            EventType::new(ItemRenamed::EVENT_TYPE),
            serde_json::json!({ "title": "Desk Lamp" }),
            &FixedClock::default(),
        )
        .with_aggregate_id(AggregateId::new("A1"))
        .unwrap();

        let result = index.handle(&Message::Event(event.into()));

        assert!(result.is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_reports_event_without_aggregate() {
        let index = ItemNameIndex::new();
        let event =
            Event::from_payload(&ItemRenamed { name: "x".into() }, &FixedClock::default()).unwrap();

        let result = index.handle(&Message::Event(event.into()));

        assert!(result.is_err());
    }
}
