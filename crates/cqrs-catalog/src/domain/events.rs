//! Domain events for the product catalog context.

use cqrs_core::event::EventPayload;
use serde::{Deserialize, Serialize};

/// Emitted when a new item is added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreated {
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price in cents.
    pub price_cents: u64,
}

impl EventPayload for ItemCreated {
    const EVENT_TYPE: &'static str = "catalog.ItemCreated";
}

/// Emitted when an item's display name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRenamed {
    /// The new display name.
    pub name: String,
}

impl EventPayload for ItemRenamed {
    const EVENT_TYPE: &'static str = "catalog.ItemRenamed";
}

/// Emitted when an item's unit price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRepriced {
    /// Price before the change, in cents.
    pub old_price_cents: u64,
    /// Price after the change, in cents.
    pub new_price_cents: u64,
}

impl EventPayload for ItemRepriced {
    const EVENT_TYPE: &'static str = "catalog.ItemRepriced";
}

/// Emitted when an item is withdrawn from sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDiscontinued {
    /// Why the item was withdrawn.
    pub reason: String,
}

impl EventPayload for ItemDiscontinued {
    const EVENT_TYPE: &'static str = "catalog.ItemDiscontinued";
}
