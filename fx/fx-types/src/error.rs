//! Error types for collision effect operations.

use thiserror::Error;

/// Errors that can occur while building or querying effect state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FxError {
    /// Part ID does not refer to a slot in the tree.
    #[error("invalid part ID: {0}")]
    InvalidPartId(u32),

    /// Part existed but has been torn down by the host.
    #[error("part {0} has been destroyed")]
    PartDestroyed(u32),

    /// Part cannot be attached below itself or one of its descendants.
    #[error("cannot attach part {child} under {parent}: would create a cycle")]
    HierarchyCycle {
        /// The part being attached.
        child: u32,
        /// The requested parent.
        parent: u32,
    },

    /// Invalid effect configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl FxError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this error means the effect target is gone.
    ///
    /// Callers treat these as a silent stop rather than a failure.
    #[must_use]
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::InvalidPartId(_) | Self::PartDestroyed(_))
    }
}
