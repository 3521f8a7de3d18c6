use thiserror::Error;

use crate::storage::StoreError;

/// Errors that abort a maintenance run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaintenanceError {
    #[error("{operation} on '{table}' gave up after {attempts} throttled attempts: {last_error}")]
    RetriesExhausted {
        operation: &'static str,
        table: String,
        attempts: u32,
        last_error: StoreError,
    },

    #[error("Batch of {size} items exceeds the store limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for maintenance operations.
pub type Result<T> = std::result::Result<T, MaintenanceError>;
