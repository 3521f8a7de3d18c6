//! Event schema document checks.

mod error;

pub use error::{Result, SchemaError};

use std::path::{Path, PathBuf};

use crate::prelude::*;
use eip_core::schema::validate_event_schema;

/// Event schema commands.
#[derive(Debug, clap::Parser)]
pub struct SchemaCommand {
    #[command(subcommand)]
    pub action: SchemaAction,
}

#[derive(Debug, clap::Subcommand)]
pub enum SchemaAction {
    /// Check event schema documents for required fields.
    Validate(ValidateCommand),
}

#[derive(Debug, clap::Parser)]
pub struct ValidateCommand {
    /// JSON schema documents to check.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Main entry point for schema command.
pub async fn run(command: SchemaCommand, global: crate::Global) -> Result<()> {
    match command.action {
        SchemaAction::Validate(cmd) => run_validate(cmd, &global).await,
    }
}

async fn run_validate(cmd: ValidateCommand, global: &crate::Global) -> Result<()> {
    let mut first_failure = None;

    for file in &cmd.files {
        let outcome = validate_file(file).await;

        if !global.is_silent() {
            match &outcome {
                Ok(()) => aprintln!("{} {}", p_g("ok"), file.display()),
                Err(SchemaError::Invalid { path, violations }) => {
                    aprintln!("{} {}", p_r("invalid"), path);
                    for violation in violations {
                        aprintln!("  {}", p_y(&format!("- {violation}")));
                    }
                }
                Err(e) => aprintln!("{} {}", p_r("error"), e),
            }
        }

        if let Err(e) = outcome {
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn validate_file(file: &Path) -> Result<()> {
    let path = file.display().to_string();
    let contents = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| SchemaError::Io {
            path: path.clone(),
            source,
        })?;
    let document: serde_json::Value =
        serde_json::from_str(&contents).map_err(|source| SchemaError::Json {
            path: path.clone(),
            source,
        })?;

    validate_event_schema(&document).map_err(|violations| SchemaError::Invalid { path, violations })
}
