//! Domain layer: events, commands, and the catalog item aggregate.

pub mod aggregates;
pub mod commands;
pub mod events;
