//! Error types for the audit trail.

use thiserror::Error;

/// Errors that can occur while building or encoding audit records.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required field was missing when building a record.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Failed to serialize a record.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
