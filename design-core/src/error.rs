//! Error types for annotation operations.

use thiserror::Error;

/// Result type for annotation operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Errors that can occur while annotating a design tree.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Node is missing identity data.
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Node geometry cannot be used (non-finite or negative size).
    #[error("Invalid geometry on node {id}: {reason}")]
    InvalidGeometry {
        /// Offending node id.
        id: String,
        /// What was wrong with the geometry.
        reason: String,
    },

    /// Configuration could not be built.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Annotation serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while building a [`crate::RuleConfiguration`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field held a value outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name as it appears in JSON.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The override document was not a JSON object.
    #[error("overrides must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The merged document did not deserialize.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
