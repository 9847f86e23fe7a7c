//! Aggregate roots for the product catalog context.

use std::sync::OnceLock;

use cqrs_core::aggregate::{AggregateCore, AggregateRoot, ApplyTable};
use cqrs_core::clock::Clock;
use cqrs_core::config::CoreConfig;
use cqrs_core::error::DomainError;
use cqrs_core::event::{AggregateId, MessageMetadata};

use super::events::{ItemCreated, ItemDiscontinued, ItemRenamed, ItemRepriced};

/// The aggregate root for a catalog item.
#[derive(Debug)]
pub struct CatalogItem {
    core: AggregateCore,
    /// Stock keeping unit.
    pub(crate) sku: String,
    /// Display name.
    pub(crate) name: String,
    /// Unit price in cents.
    pub(crate) price_cents: u64,
    /// Whether the item has been withdrawn from sale.
    pub(crate) discontinued: bool,
}

impl CatalogItem {
    /// Creates a new catalog item, producing an `ItemCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the SKU or name is blank.
    pub fn create(
        item_id: AggregateId,
        sku: &str,
        name: &str,
        price_cents: u64,
        config: &CoreConfig,
        metadata: MessageMetadata,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let sku = required("sku", sku)?;
        let name = required("name", name)?;

        let mut item = Self::from_core(AggregateCore::new(item_id).with_config(config));
        item.record(
            &ItemCreated {
                sku,
                name,
                price_cents,
            },
            metadata,
            clock,
        )?;
        Ok(item)
    }

    /// Renames the item, producing an `ItemRenamed` event. Renaming to the
    /// current name records nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or the item is
    /// discontinued.
    pub fn rename(
        &mut self,
        name: &str,
        metadata: MessageMetadata,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        let name = required("name", name)?;
        if name == self.name {
            return Ok(());
        }
        self.record(&ItemRenamed { name }, metadata, clock)
    }

    /// Changes the unit price, producing an `ItemRepriced` event. Setting the
    /// current price records nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the item is discontinued.
    pub fn reprice(
        &mut self,
        price_cents: u64,
        metadata: MessageMetadata,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        if price_cents == self.price_cents {
            return Ok(());
        }
        self.record(
            &ItemRepriced {
                old_price_cents: self.price_cents,
                new_price_cents: price_cents,
            },
            metadata,
            clock,
        )
    }

    /// Withdraws the item from sale, producing an `ItemDiscontinued` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the item is already discontinued.
    pub fn discontinue(
        &mut self,
        reason: &str,
        metadata: MessageMetadata,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.record(
            &ItemDiscontinued {
                reason: reason.trim().to_owned(),
            },
            metadata,
            clock,
        )
    }

    /// Stock keeping unit.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price in cents.
    #[must_use]
    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }

    /// Whether the item has been withdrawn from sale.
    #[must_use]
    pub fn is_discontinued(&self) -> bool {
        self.discontinued
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.discontinued {
            let id = self.aggregate_id().map_or("<unassigned>", AggregateId::as_str);
            return Err(DomainError::Validation(format!("item {id} is discontinued")));
        }
        Ok(())
    }

    fn apply_item_created(&mut self, payload: ItemCreated) -> Result<(), DomainError> {
        self.sku = payload.sku;
        self.name = payload.name;
        self.price_cents = payload.price_cents;
        Ok(())
    }

    fn apply_item_renamed(&mut self, payload: ItemRenamed) -> Result<(), DomainError> {
        self.name = payload.name;
        Ok(())
    }

    fn apply_item_repriced(&mut self, payload: ItemRepriced) -> Result<(), DomainError> {
        self.price_cents = payload.new_price_cents;
        Ok(())
    }

    fn apply_item_discontinued(&mut self, _payload: ItemDiscontinued) -> Result<(), DomainError> {
        self.discontinued = true;
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_owned())
}

impl AggregateRoot for CatalogItem {
    const AGGREGATE_TYPE: &'static str = "catalog_item";

    fn from_core(core: AggregateCore) -> Self {
        Self {
            core,
            sku: String::new(),
            name: String::new(),
            price_cents: 0,
            discontinued: false,
        }
    }

    fn core(&self) -> &AggregateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore {
        &mut self.core
    }

    fn apply_table() -> &'static ApplyTable<Self> {
        static TABLE: OnceLock<ApplyTable<CatalogItem>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ApplyTable::new()
                .on::<ItemCreated>(Self::apply_item_created)
                .on::<ItemRenamed>(Self::apply_item_renamed)
                .on::<ItemRepriced>(Self::apply_item_repriced)
                .on::<ItemDiscontinued>(Self::apply_item_discontinued)
        })
    }
}
