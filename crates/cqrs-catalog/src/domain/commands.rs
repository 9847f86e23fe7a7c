//! Commands for the product catalog context.

use cqrs_core::command::Command;
use cqrs_core::event::AggregateId;
use uuid::Uuid;

/// Command to add a new item to the catalog.
#[derive(Debug, Clone)]
pub struct CreateItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier of the new item.
    pub item_id: AggregateId,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price in cents.
    pub price_cents: u64,
}

/// Command to rename an item.
#[derive(Debug, Clone)]
pub struct RenameItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item to rename.
    pub item_id: AggregateId,
    /// The new display name.
    pub name: String,
}

/// Command to change an item's price.
#[derive(Debug, Clone)]
pub struct RepriceItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item to reprice.
    pub item_id: AggregateId,
    /// The new unit price in cents.
    pub price_cents: u64,
}

/// Command to withdraw an item from sale.
#[derive(Debug, Clone)]
pub struct DiscontinueItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item to discontinue.
    pub item_id: AggregateId,
    /// Why the item is withdrawn.
    pub reason: String,
}

impl Command for CreateItem {
    fn command_type(&self) -> &'static str {
        "catalog.create_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RenameItem {
    fn command_type(&self) -> &'static str {
        "catalog.rename_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RepriceItem {
    fn command_type(&self) -> &'static str {
        "catalog.reprice_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for DiscontinueItem {
    fn command_type(&self) -> &'static str {
        "catalog.discontinue_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
