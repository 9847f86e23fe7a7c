//! Core configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Environment variable selecting the [`MissingHandlerPolicy`].
pub const MISSING_HANDLER_POLICY_ENV: &str = "CQRS_MISSING_HANDLER_POLICY";

/// What an aggregate does with an event type it has no apply handler for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHandlerPolicy {
    /// Fail with `DomainError::MissingEventHandler`.
    #[default]
    Strict,
    /// Skip the event without changing state.
    Lenient,
}

impl fmt::Display for MissingHandlerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

impl FromStr for MissingHandlerPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(DomainError::Validation(format!(
                "unknown missing handler policy '{other}', expected 'strict' or 'lenient'"
            ))),
        }
    }
}

/// Settings shared by every aggregate built through this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Policy for event types without an apply handler.
    pub missing_handler: MissingHandlerPolicy,
}

impl CoreConfig {
    /// Reads configuration from the environment. Unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a variable is set to an invalid
    /// value.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let missing_handler = lookup(MISSING_HANDLER_POLICY_ENV)
            .map(|raw| raw.parse::<MissingHandlerPolicy>())
            .transpose()?
            .unwrap_or_default();
        Ok(Self { missing_handler })
    }
}
