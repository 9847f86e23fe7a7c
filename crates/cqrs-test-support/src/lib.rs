//! Shared test mocks and utilities for the cqrs workspace.

mod clock;
mod handler;
mod locator;
mod logging;
mod store;

pub use clock::FixedClock;
pub use handler::{FailingHandler, RecordingHandler};
pub use locator::RegistryLocator;
pub use logging::init_tracing;
pub use store::{FailingEventStore, InMemoryEventStore};
