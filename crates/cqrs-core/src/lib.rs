//! CQRS Core — event-sourced aggregates and a fault-isolating event bus.
//!
//! Aggregates change state only by applying events: new events are
//! recorded and buffered until pulled, committed events are replayed from
//! an [`stream::EventStream`]. The [`bus::EventBus`] hands pulled events
//! to the handlers a locator resolves and turns handler failures into
//! fault messages. Storage and handler discovery are collaborators this
//! crate only defines traits for.

pub mod aggregate;
pub mod bus;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod event_type;
pub mod handler;
pub mod message;
pub mod store;
pub mod stream;
