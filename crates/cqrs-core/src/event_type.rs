//! Event type names and the naming convention derived from them.
//!
//! An event type is a possibly namespaced name such as `catalog.ItemCreated`,
//! `catalog::ItemCreated` or `Catalog\Event\ItemCreated`. Both the key an
//! aggregate's apply table is indexed by and the key a handler locator
//! resolves on are pure functions of that name:
//!
//! | event type               | `short_name`  | `handler_key` | `apply_method`      |
//! |--------------------------|---------------|---------------|---------------------|
//! | `catalog.ItemCreated`    | `ItemCreated` | `ItemCreated` | `applyItemCreated`  |
//! | `catalog::itemRenamed`   | `itemRenamed` | `ItemRenamed` | `applyItemRenamed`  |
//! | `Fault`                  | `Fault`       | `Fault`       | `applyFault`        |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of every apply-method name.
pub const APPLY_PREFIX: &str = "apply";

const SEPARATORS: [&str; 3] = ["::", ".", "\\"];

/// The full type name of an event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Creates an event type from its full name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the full name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the final namespace segment.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.0)
    }

    /// Returns the key handler locators resolve this type on.
    #[must_use]
    pub fn handler_key(&self) -> String {
        handler_key(&self.0)
    }

    /// Returns the name of the aggregate method that applies this type.
    #[must_use]
    pub fn apply_method(&self) -> String {
        apply_method(&self.0)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Strips every namespace segment, keeping the final one.
#[must_use]
pub fn short_name(name: &str) -> &str {
    SEPARATORS
        .iter()
        .filter_map(|sep| name.rfind(sep).map(|idx| idx + sep.len()))
        .max()
        .map_or(name, |start| &name[start..])
}

/// The short name with its first character upper-cased.
#[must_use]
pub fn handler_key(name: &str) -> String {
    let short = short_name(name);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// [`APPLY_PREFIX`] followed by the handler key.
#[must_use]
pub fn apply_method(name: &str) -> String {
    format!("{APPLY_PREFIX}{}", handler_key(name))
}
