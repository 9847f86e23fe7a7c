//! End-to-end tests: record, pull, persist, publish, and replay catalog items.

use std::sync::Arc;

use cqrs_catalog::application::command_handlers::{
    CatalogContext, handle_create_item, handle_rename_item, handle_reprice_item,
};
use cqrs_catalog::application::projections::ItemNameIndex;
use cqrs_catalog::application::query_handlers::get_item_by_id;
use cqrs_catalog::domain::aggregates::CatalogItem;
use cqrs_catalog::domain::commands::{CreateItem, RenameItem, RepriceItem};
use cqrs_catalog::domain::events::ItemCreated;
use cqrs_core::aggregate::AggregateRoot;
use cqrs_core::bus::EventBus;
use cqrs_core::config::CoreConfig;
use cqrs_core::event::{AggregateId, MessageMetadata};
use cqrs_core::handler::LoggingFaultHandler;
use cqrs_core::stream::EventStream;
use cqrs_test_support::{
    FailingHandler, FixedClock, InMemoryEventStore, RecordingHandler, RegistryLocator, init_tracing,
};
use uuid::Uuid;

#[test]
fn test_recorded_history_replays_to_identical_state() {
    // Arrange
    let clock = FixedClock::default();
    let config = CoreConfig::default();
    let id = AggregateId::new("A1");
    let mut item = CatalogItem::create(
        id.clone(),
        "SKU-1",
        "x",
        1999,
        &config,
        MessageMetadata::new(),
        &clock,
    )
    .unwrap();
    item.rename("y", MessageMetadata::new(), &clock).unwrap();
    assert_eq!(item.name(), "y");

    // Act
    let pulled = item.pull_uncommitted_events();
    let stream = EventStream::from_recorded(id.clone(), pulled.clone()).unwrap();
    let rebuilt = CatalogItem::load(stream, &config).unwrap();

    // Assert
    assert_eq!(pulled.len(), 2);
    assert!(
        pulled
            .iter()
            .all(|recorded| recorded.event.aggregate_id() == Some(&id))
    );
    assert!(item.pull_uncommitted_events().is_empty());
    assert_eq!(rebuilt.name(), item.name());
    assert_eq!(rebuilt.sku(), item.sku());
    assert_eq!(rebuilt.price_cents(), item.price_cents());
    assert_eq!(rebuilt.version(), item.version());
    assert!(rebuilt.uncommitted_events().is_empty());
}

#[tokio::test]
async fn test_commands_feed_projection_and_isolate_failing_subscriber() {
    // Arrange
    init_tracing();
    let clock = FixedClock::default();
    let config = CoreConfig::default();
    let store = InMemoryEventStore::new();
    let locator = RegistryLocator::new();

    let index = Arc::new(ItemNameIndex::new());
    let mailer = Arc::new(FailingHandler::new("mailer", "smtp unavailable"));
    let audit = Arc::new(RecordingHandler::new("audit"));
    let faults = Arc::new(RecordingHandler::new("fault_recorder"));
    for event_type in ItemNameIndex::event_types() {
        locator.subscribe(event_type, index.clone());
    }
    locator.subscribe_to::<ItemCreated>(mailer.clone());
    locator.subscribe_to::<ItemCreated>(audit.clone());
    locator.subscribe_faults(Arc::new(LoggingFaultHandler));
    locator.subscribe_faults(faults.clone());

    let bus = EventBus::new(locator);
    let ctx = CatalogContext {
        clock: &clock,
        store: &store,
        bus: &bus,
        config: &config,
    };
    let item_id = AggregateId::generate();

    // Act
    handle_create_item(
        &CreateItem {
            correlation_id: Uuid::new_v4(),
            item_id: item_id.clone(),
            sku: "SKU-1".to_owned(),
            name: "Lamp".to_owned(),
            price_cents: 1999,
        },
        &ctx,
    )
    .await
    .unwrap();
    handle_rename_item(
        &RenameItem {
            correlation_id: Uuid::new_v4(),
            item_id: item_id.clone(),
            name: "Desk Lamp".to_owned(),
        },
        &ctx,
    )
    .await
    .unwrap();
    handle_reprice_item(
        &RepriceItem {
            correlation_id: Uuid::new_v4(),
            item_id: item_id.clone(),
            price_cents: 2499,
        },
        &ctx,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(index.name_of(&item_id).as_deref(), Some("Desk Lamp"));
    assert_eq!(mailer.calls(), 1);
    assert_eq!(audit.message_types(), vec!["catalog.ItemCreated"]);

    let recorded_faults = faults.faults();
    assert_eq!(recorded_faults.len(), 1);
    assert_eq!(recorded_faults[0].handler(), "mailer");

    let view = get_item_by_id(&item_id, &store, &config).await.unwrap();
    assert_eq!(view.name, "Desk Lamp");
    assert_eq!(view.price_cents, 2499);
    assert_eq!(view.version, 3);
}

#[tokio::test]
async fn test_failing_fault_handler_is_swallowed() {
    let clock = FixedClock::default();
    let config = CoreConfig::default();
    let store = InMemoryEventStore::new();
    let locator = RegistryLocator::new();
    let projector = Arc::new(FailingHandler::new("projector", "boom"));
    let broken_fault_log = Arc::new(FailingHandler::new("fault_log", "disk full"));
    let later_fault_log = Arc::new(RecordingHandler::new("later_fault_log"));
    locator.subscribe_to::<ItemCreated>(projector.clone());
    locator.subscribe_faults(broken_fault_log.clone());
    locator.subscribe_faults(later_fault_log.clone());
    let bus = EventBus::new(locator);
    let ctx = CatalogContext {
        clock: &clock,
        store: &store,
        bus: &bus,
        config: &config,
    };

    let result = handle_create_item(
        &CreateItem {
            correlation_id: Uuid::new_v4(),
            item_id: AggregateId::generate(),
            sku: "SKU-1".to_owned(),
            name: "Lamp".to_owned(),
            price_cents: 1999,
        },
        &ctx,
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(projector.calls(), 1);
    assert_eq!(broken_fault_log.calls(), 1);
    assert!(later_fault_log.received().is_empty());
}
