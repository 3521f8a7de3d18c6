//! Error types for maintenance commands.

use eip_core::maintenance::MaintenanceError;
use eip_core::transform::RetentionOutOfRange;
use thiserror::Error;

/// Result type alias for maintenance module.
pub type Result<T> = std::result::Result<T, MaintenanceCliError>;

/// Errors that can occur while running a maintenance routine.
#[derive(Error, Debug)]
pub enum MaintenanceCliError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Table '{table_name}' not found")]
    TableNotFound { table_name: String },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Invalid retention: {0}")]
    Retention(#[from] RetentionOutOfRange),

    #[error(transparent)]
    Maintenance(#[from] MaintenanceError),
}

impl From<dialoguer::Error> for MaintenanceCliError {
    fn from(err: dialoguer::Error) -> Self {
        MaintenanceCliError::Prompt(err.to_string())
    }
}
