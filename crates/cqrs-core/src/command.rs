//! Command abstractions.

use uuid::Uuid;

use crate::event::MessageMetadata;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// Metadata to record alongside every event this command produces.
    fn event_metadata(&self) -> MessageMetadata {
        MessageMetadata::correlated(self.correlation_id())
            .with("command_type", self.command_type())
    }
}
