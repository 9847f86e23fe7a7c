//! Query handlers for the product catalog context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use cqrs_core::aggregate::AggregateRoot;
use cqrs_core::config::CoreConfig;
use cqrs_core::error::DomainError;
use cqrs_core::event::AggregateId;
use cqrs_core::store::EventStore;
use serde::Serialize;

use crate::application::command_handlers;

/// Read-only view of a catalog item aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItemView {
    /// The item identifier.
    pub item_id: AggregateId,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price in cents.
    pub price_cents: u64,
    /// Whether the item has been withdrawn from sale.
    pub discontinued: bool,
    /// Current version (event count).
    pub version: u64,
}

/// Retrieves a catalog item by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID,
/// and any error raised while validating or replaying the stream.
pub async fn get_item_by_id(
    item_id: &AggregateId,
    store: &dyn EventStore,
    config: &CoreConfig,
) -> Result<CatalogItemView, DomainError> {
    let item = command_handlers::load_item(item_id, store, config).await?;
    Ok(CatalogItemView {
        item_id: item_id.clone(),
        sku: item.sku.clone(),
        name: item.name.clone(),
        price_cents: item.price_cents,
        discontinued: item.discontinued,
        version: item.version(),
    })
}
