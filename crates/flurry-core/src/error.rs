//! Configuration error types.

use thiserror::Error;

/// Errors raised while building or validating an effect configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration value is out of its accepted domain.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// The offending configuration key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color `{0}`, expected #rgb or #rrggbb")]
    InvalidColor(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
