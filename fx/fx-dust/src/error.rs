//! Error types for dust configuration loading.

use thiserror::Error;

/// Errors that can occur while reading the dust color configuration.
///
/// Only structural problems and unreadable sources abort a load. Individual
/// bad records are logged as [`DustError::InvalidColor`] or
/// [`DustError::MissingBodyName`] warnings and skipped.
#[derive(Debug, Error)]
pub enum DustError {
    /// Malformed config-node text.
    #[error("config parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A node was opened but never closed.
    #[error("unclosed node '{node}' opened at line {line}")]
    Unclosed {
        /// Name of the unclosed node.
        node: String,
        /// Line where the node was opened.
        line: usize,
    },

    /// The config source could not be read.
    #[error("failed to read config source '{source_name}': {message}")]
    Source {
        /// Human readable description of the source.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// A biome color record was rejected.
    #[error("invalid biome colour definition '{biome}' in body \"{body}\": {reason}")]
    InvalidColor {
        /// Body the record belongs to.
        body: String,
        /// Biome name of the record.
        biome: String,
        /// Why the record was rejected.
        reason: String,
    },

    /// A `DustBody` node without a `name` value.
    #[error("invalid DustBody definition: \"name\" field is missing")]
    MissingBodyName,
}

impl DustError {
    /// Create a parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid color error.
    pub fn invalid_color(
        body: impl Into<String>,
        biome: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidColor {
            body: body.into(),
            biome: biome.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single record.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidColor { .. } | Self::MissingBodyName)
    }
}

/// Result type for dust configuration operations.
pub type Result<T> = std::result::Result<T, DustError>;
