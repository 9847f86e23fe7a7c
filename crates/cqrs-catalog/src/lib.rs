//! Product catalog bounded context.
//!
//! Responsible for creating catalog items, renaming and repricing them, and
//! discontinuing them. Built on `cqrs-core` aggregates and the event bus.

pub mod application;
pub mod domain;
