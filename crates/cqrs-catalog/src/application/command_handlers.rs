//! Command handlers for the product catalog context.
//!
//! Each handler loads the item from the event store, executes the command,
//! appends the resulting events, and publishes them on the event bus.

use cqrs_core::aggregate::AggregateRoot;
use cqrs_core::bus::EventBus;
use cqrs_core::clock::Clock;
use cqrs_core::command::Command;
use cqrs_core::config::CoreConfig;
use cqrs_core::error::DomainError;
use cqrs_core::event::{AggregateId, RecordedEvent};
use cqrs_core::handler::HandlerLocator;
use cqrs_core::store::EventStore;
use tracing::info;

use crate::domain::aggregates::CatalogItem;
use crate::domain::commands::{CreateItem, DiscontinueItem, RenameItem, RepriceItem};

/// Collaborators shared by every catalog command handler.
pub struct CatalogContext<'a, L> {
    /// Source of event timestamps.
    pub clock: &'a dyn Clock,
    /// Where item streams are loaded from and appended to.
    pub store: &'a dyn EventStore,
    /// Where committed events are published.
    pub bus: &'a EventBus<L>,
    /// Aggregate settings.
    pub config: &'a CoreConfig,
}

/// Reconstitutes a `CatalogItem` from its stored stream.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the item has no events, and
/// any error raised while validating or replaying the stream.
pub(crate) async fn load_item(
    item_id: &AggregateId,
    store: &dyn EventStore,
    config: &CoreConfig,
) -> Result<CatalogItem, DomainError> {
    let stream = store.load_stream(item_id).await?;
    CatalogItem::load(stream, config)
}

/// Appends the item's uncommitted events and publishes them once stored.
async fn commit<L: HandlerLocator>(
    item: &mut CatalogItem,
    command: &dyn Command,
    ctx: &CatalogContext<'_, L>,
) -> Result<Vec<RecordedEvent>, DomainError> {
    let item_id = item
        .aggregate_id()
        .cloned()
        .ok_or(DomainError::Uninitialized(CatalogItem::AGGREGATE_TYPE))?;
    let expected_version = item.core().committed_version();
    let events = item.pull_uncommitted_events();
    if events.is_empty() {
        return Ok(events);
    }

    ctx.store.append(&item_id, expected_version, &events).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        %item_id,
        events = events.len(),
        "catalog events committed"
    );

    ctx.bus.publish_all(events.iter().cloned());
    Ok(events)
}

/// Handles the `CreateItem` command: records `ItemCreated` on a new item and
/// persists it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the item already exists or the
/// command is invalid, and `DomainError` if loading or appending fails.
pub async fn handle_create_item<L: HandlerLocator>(
    command: &CreateItem,
    ctx: &CatalogContext<'_, L>,
) -> Result<Vec<RecordedEvent>, DomainError> {
    if !ctx.store.load(&command.item_id).await?.is_empty() {
        return Err(DomainError::Validation(format!(
            "item {} already exists",
            command.item_id
        )));
    }

    let mut item = CatalogItem::create(
        command.item_id.clone(),
        &command.sku,
        &command.name,
        command.price_cents,
        ctx.config,
        command.event_metadata(),
        ctx.clock,
    )?;
    commit(&mut item, command, ctx).await
}

/// Handles the `RenameItem` command.
///
/// # Errors
///
/// Returns `DomainError` if the item is missing, the rename is invalid, or
/// loading or appending fails.
pub async fn handle_rename_item<L: HandlerLocator>(
    command: &RenameItem,
    ctx: &CatalogContext<'_, L>,
) -> Result<Vec<RecordedEvent>, DomainError> {
    let mut item = load_item(&command.item_id, ctx.store, ctx.config).await?;
    item.rename(&command.name, command.event_metadata(), ctx.clock)?;
    commit(&mut item, command, ctx).await
}

/// Handles the `RepriceItem` command.
///
/// # Errors
///
/// Returns `DomainError` if the item is missing or discontinued, or loading
/// or appending fails.
pub async fn handle_reprice_item<L: HandlerLocator>(
    command: &RepriceItem,
    ctx: &CatalogContext<'_, L>,
) -> Result<Vec<RecordedEvent>, DomainError> {
    let mut item = load_item(&command.item_id, ctx.store, ctx.config).await?;
    item.reprice(command.price_cents, command.event_metadata(), ctx.clock)?;
    commit(&mut item, command, ctx).await
}

/// Handles the `DiscontinueItem` command.
///
/// # Errors
///
/// Returns `DomainError` if the item is missing or already discontinued, or
/// loading or appending fails.
pub async fn handle_discontinue_item<L: HandlerLocator>(
    command: &DiscontinueItem,
    ctx: &CatalogContext<'_, L>,
) -> Result<Vec<RecordedEvent>, DomainError> {
    let mut item = load_item(&command.item_id, ctx.store, ctx.config).await?;
    item.discontinue(&command.reason, command.event_metadata(), ctx.clock)?;
    commit(&mut item, command, ctx).await
}
