//! Aggregate root abstraction.
//!
//! An aggregate embeds an [`AggregateCore`] holding the identifier, version
//! and uncommitted events, and registers one apply handler per event type
//! in an [`ApplyTable`]. Every state change goes through
//! [`AggregateRoot::record_event`] (new events) or
//! [`AggregateRoot::reconstitute_from_history`] (committed events).

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::clock::Clock;
use crate::config::{CoreConfig, MissingHandlerPolicy};
use crate::error::DomainError;
use crate::event::{AggregateId, Event, EventPayload, MessageMetadata, RecordedEvent};
use crate::event_type;
use crate::stream::EventStream;

type ApplyFn<A> = Box<dyn Fn(&mut A, &Event) -> Result<(), DomainError> + Send + Sync>;

/// Registration table mapping apply-method names to state transitions.
///
/// Keys follow the naming convention in [`crate::event_type`]: a handler
/// for `catalog.ItemCreated` is registered under `applyItemCreated`.
pub struct ApplyTable<A> {
    handlers: HashMap<String, ApplyFn<A>>,
}

impl<A: 'static> ApplyTable<A> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler that receives the decoded payload.
    ///
    /// # Panics
    ///
    /// Panics if a handler is already registered for the same apply method.
    #[must_use]
    pub fn on<P: EventPayload + 'static>(
        self,
        handler: fn(&mut A, P) -> Result<(), DomainError>,
    ) -> Self {
        self.on_event(P::EVENT_TYPE, move |aggregate, event| {
            handler(aggregate, event.decode::<P>()?)
        })
    }

    /// Registers a handler that receives the whole event.
    ///
    /// # Panics
    ///
    /// Panics if a handler is already registered for the same apply method.
    #[must_use]
    pub fn on_event<F>(mut self, event_type: &str, handler: F) -> Self
    where
        F: Fn(&mut A, &Event) -> Result<(), DomainError> + Send + Sync + 'static,
    {
        let method = event_type::apply_method(event_type);
        assert!(
            !self.handlers.contains_key(&method),
            "duplicate apply handler '{method}' for event '{event_type}'"
        );
        self.handlers.insert(method, Box::new(handler));
        self
    }
}

impl<A> ApplyTable<A> {
    /// Returns `true` if a handler is registered for `method`.
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered apply-method names, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    fn get(&self, method: &str) -> Option<&ApplyFn<A>> {
        self.handlers.get(method)
    }
}

impl<A: 'static> Default for ApplyTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ApplyTable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods().collect();
        methods.sort_unstable();
        f.debug_struct("ApplyTable").field("methods", &methods).finish()
    }
}

/// State shared by every aggregate root.
#[derive(Debug)]
pub struct AggregateCore {
    aggregate_id: Option<AggregateId>,
    version: u64,
    reconstituted: bool,
    missing_handler: MissingHandlerPolicy,
    uncommitted_events: Vec<RecordedEvent>,
}

impl AggregateCore {
    /// Core of a newly created aggregate.
    #[must_use]
    pub fn new(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Self::uninitialized()
        }
    }

    /// Core of an aggregate about to be reconstituted from history.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self {
            aggregate_id: None,
            version: 0,
            reconstituted: false,
            missing_handler: MissingHandlerPolicy::default(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Applies the settings in `config`.
    #[must_use]
    pub fn with_config(self, config: &CoreConfig) -> Self {
        self.with_policy(config.missing_handler)
    }

    /// Sets the policy for event types without an apply handler.
    #[must_use]
    pub fn with_policy(mut self, missing_handler: MissingHandlerPolicy) -> Self {
        self.missing_handler = missing_handler;
        self
    }

    /// The aggregate identifier, once assigned.
    #[must_use]
    pub fn aggregate_id(&self) -> Option<&AggregateId> {
        self.aggregate_id.as_ref()
    }

    /// Number of events applied so far, committed or not.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version of the last committed event.
    #[must_use]
    pub fn committed_version(&self) -> u64 {
        self.version - self.uncommitted_events.len() as u64
    }

    /// The policy for event types without an apply handler.
    #[must_use]
    pub fn missing_handler(&self) -> MissingHandlerPolicy {
        self.missing_handler
    }

    /// Whether history has been replayed into this aggregate.
    #[must_use]
    pub fn is_reconstituted(&self) -> bool {
        self.reconstituted
    }

    fn has_history(&self) -> bool {
        self.reconstituted || self.version > 0 || !self.uncommitted_events.is_empty()
    }
}

/// Trait for aggregate roots that record and replay events.
pub trait AggregateRoot: Sized + Send + Sync + 'static {
    /// Aggregate type name, used in errors and logs.
    const AGGREGATE_TYPE: &'static str;

    /// Builds an aggregate in its initial state around `core`.
    fn from_core(core: AggregateCore) -> Self;

    /// The embedded core.
    fn core(&self) -> &AggregateCore;

    /// The embedded core, mutably.
    fn core_mut(&mut self) -> &mut AggregateCore;

    /// The apply table for this aggregate type, built once per type.
    fn apply_table() -> &'static ApplyTable<Self>;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Option<&AggregateId> {
        self.core().aggregate_id()
    }

    /// Returns the current version (number of events applied).
    fn version(&self) -> u64 {
        self.core().version()
    }

    /// Events recorded since the last pull.
    fn uncommitted_events(&self) -> &[RecordedEvent] {
        &self.core().uncommitted_events
    }

    /// Stamps `event` with this aggregate's identifier and the next sequence
    /// number, applies it, and buffers it as uncommitted. Nothing is buffered
    /// if applying fails.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Uninitialized` if the aggregate has no identifier,
    /// `DomainError::AggregateIdentifierMismatch` if the event belongs to
    /// another aggregate, `DomainError::SequenceNumberConflict` if it already
    /// holds a position other than the next one, and otherwise whatever the
    /// apply step returns.
    fn record_event(
        &mut self,
        mut event: Event,
        metadata: MessageMetadata,
    ) -> Result<(), DomainError> {
        let aggregate_id = self
            .aggregate_id()
            .cloned()
            .ok_or(DomainError::Uninitialized(Self::AGGREGATE_TYPE))?;
        event.assign_aggregate_id(&aggregate_id)?;
        event.assign_sequence_number(self.version() + 1)?;

        apply(self, &event)?;

        self.core_mut()
            .uncommitted_events
            .push(RecordedEvent::new(event, metadata));
        Ok(())
    }

    /// Builds an event from `payload` and records it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Payload` if the payload cannot be serialized, and
    /// otherwise the errors of [`AggregateRoot::record_event`].
    fn record<P: EventPayload>(
        &mut self,
        payload: &P,
        metadata: MessageMetadata,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let event = Event::from_payload(payload, clock)?;
        self.record_event(event, metadata)
    }

    /// Returns the uncommitted events and clears the buffer.
    fn pull_uncommitted_events(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.core_mut().uncommitted_events)
    }

    /// Replays committed history into a pristine aggregate. Replayed events
    /// are never buffered as uncommitted. An aggregate whose replay failed
    /// part-way must be discarded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyReconstituted` if the aggregate has
    /// recorded or replayed any event, or carries a different identifier.
    /// Otherwise returns whatever the apply step returns.
    fn reconstitute_from_history(&mut self, stream: EventStream) -> Result<(), DomainError> {
        let core = self.core();
        let conflicting_id = core
            .aggregate_id()
            .is_some_and(|id| id != stream.aggregate_id());
        if core.has_history() || conflicting_id {
            return Err(DomainError::AlreadyReconstituted {
                aggregate_id: stream.aggregate_id().clone(),
            });
        }

        let (aggregate_id, events) = stream.into_parts();
        debug!(
            aggregate_type = Self::AGGREGATE_TYPE,
            %aggregate_id,
            events = events.len(),
            "reconstituting aggregate"
        );

        let core = self.core_mut();
        core.aggregate_id = Some(aggregate_id);
        core.reconstituted = true;

        for event in &events {
            apply(self, event)?;
        }
        Ok(())
    }

    /// Builds a fresh aggregate from a committed stream.
    ///
    /// # Errors
    ///
    /// Returns whatever [`AggregateRoot::reconstitute_from_history`] returns.
    fn load(stream: EventStream, config: &CoreConfig) -> Result<Self, DomainError> {
        let mut aggregate = Self::from_core(AggregateCore::uninitialized().with_config(config));
        aggregate.reconstitute_from_history(stream)?;
        Ok(aggregate)
    }
}

/// Runs the registered handler for `event` and advances the version.
fn apply<A: AggregateRoot>(aggregate: &mut A, event: &Event) -> Result<(), DomainError> {
    let method = event.event_type().apply_method();
    match A::apply_table().get(&method) {
        Some(handler) => handler(aggregate, event)?,
        None => match aggregate.core().missing_handler() {
            MissingHandlerPolicy::Strict => {
                return Err(DomainError::MissingEventHandler {
                    aggregate_type: A::AGGREGATE_TYPE,
                    event_type: event.event_type().to_string(),
                    method,
                });
            }
            MissingHandlerPolicy::Lenient => {
                debug!(
                    aggregate_type = A::AGGREGATE_TYPE,
                    event_type = %event.event_type(),
                    %method,
                    "no apply handler; event ignored"
                );
            }
        },
    }
    aggregate.core_mut().version += 1;
    Ok(())
}
