//! Error types for schema commands.

use eip_core::schema::SchemaViolation;
use thiserror::Error;

/// Result type alias for schema module.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("'{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("'{path}' has {count} schema violation(s)", count = violations.len())]
    Invalid {
        path: String,
        violations: Vec<SchemaViolation>,
    },
}
