//! Maintenance routines for the event integration store.

mod client;
mod config;
mod error;
mod summary;

pub use error::{MaintenanceCliError, Result};

use crate::prelude::*;
use dialoguer::{Confirm, Input};
use eip_core::maintenance::run_maintenance;
use eip_core::storage::keys::{EXPIRY_ATTRIBUTE, FAILURE_PREFIX};
use eip_core::storage::{ScanFilter, ScanRequest};
use eip_core::transform::{ExpiryEnricher, MAX_RETENTION_DAYS};
use eip_store::DynamoDbStore;

const REJECTIONS_SHOWN: usize = 20;

/// Maintenance commands.
#[derive(Debug, clap::Parser)]
pub struct MaintenanceCommand {
    #[command(subcommand)]
    pub action: MaintenanceAction,
}

/// Available maintenance actions.
#[derive(Debug, clap::Subcommand)]
pub enum MaintenanceAction {
    /// Backfill the expiry attribute on delivery-failure records.
    UpdateTtl(UpdateTtlCommand),
}

/// Backfill the expiry attribute on delivery-failure records.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Backfill the expiry attribute on delivery-failure records.

Scans the failures table for records whose sort key starts with FAIL#,
derives the failure time from the sort key and writes the record back
with an expiry 60 days later. Throttled scans and writes are retried
with exponential backoff.

Environment variables:
  AWS_ENDPOINT_URL             - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION                   - AWS region (defaults to us-east-1)
  EIP_FAILURES_TABLE           - Default table name
  EIP_SCAN_PAGE_SIZE           - Items evaluated per scan page
  EIP_BACKOFF_INITIAL_MS       - First backoff wait in milliseconds
  EIP_BACKOFF_MAX_ATTEMPTS     - Throttled attempts before giving up
  EIP_FAILURE_RETENTION_DAYS   - Days a failure record is retained")]
pub struct UpdateTtlCommand {
    /// Table name to use (prompted when omitted).
    #[arg(long)]
    pub table_name: Option<String>,

    /// Items evaluated per scan page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Days a failure record is retained.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_RETENTION_DAYS))]
    pub retention_days: Option<i64>,

    /// Also rewrite records that already carry an expiry.
    #[arg(long)]
    pub all: bool,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Main entry point for maintenance command.
pub async fn run(command: MaintenanceCommand, global: crate::Global) -> Result<()> {
    match command.action {
        MaintenanceAction::UpdateTtl(cmd) => run_update_ttl(cmd, &global).await,
    }
}

async fn run_update_ttl(cmd: UpdateTtlCommand, global: &crate::Global) -> Result<()> {
    let settings = config::MaintenanceConfig::from_env();
    let aws_config = client::AwsConfig::default();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
    }

    let table_name = match cmd.table_name {
        Some(name) => name,
        None if cmd.force => settings.table_name.clone(),
        None => Input::<String>::new()
            .with_prompt("Failures table")
            .default(settings.table_name.clone())
            .interact_text()?,
    };
    let page_size = cmd.page_size.filter(|&n| n > 0).unwrap_or(settings.page_size);
    let retention_days = cmd.retention_days.unwrap_or(settings.retention_days);
    let enricher = ExpiryEnricher::default().with_retention_days(retention_days)?;
    let policy = settings.backoff_policy();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Table:"), table_name);
        aprintln!("{} {}", p_b("Page size:"), page_size);
        aprintln!("{} {} days", p_b("Retention:"), retention_days);
        aprintln!(
            "{} {:?} initial, {} attempts",
            p_b("Backoff:"),
            policy.initial_delay,
            policy.max_attempts
        );
        aprintln!();
    }

    if !cmd.force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Rewrite failure records in '{}' on {}?",
                table_name,
                aws_config.target_display()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Err(MaintenanceCliError::UserCancelled);
        }
    }

    let dynamo_client = client::create_client(&aws_config).await;
    if !client::table_exists(&dynamo_client, &table_name).await? {
        return Err(MaintenanceCliError::TableNotFound { table_name });
    }

    match client::ttl_attribute(&dynamo_client, &table_name).await {
        Ok(Some(attribute)) if attribute == EXPIRY_ATTRIBUTE => {}
        Ok(_) => {
            if !global.is_silent() {
                let warning = format!(
                    "Warning: TTL is not enabled on '{EXPIRY_ATTRIBUTE}'; records will not expire."
                );
                aprintln!("{}", p_y(&warning));
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not read TTL settings"),
    }

    let mut filter = ScanFilter::default().sort_key_prefix(FAILURE_PREFIX);
    if !cmd.all {
        filter = filter.missing_attribute(EXPIRY_ATTRIBUTE);
    }
    let request = ScanRequest::new(&table_name, page_size).with_filter(filter);
    let store = DynamoDbStore::new(dynamo_client);

    if !global.is_silent() {
        aprintln!("{}", p_b("Updating expiry attributes..."));
    }

    let result = run_maintenance(&store, request, &enricher, policy).await?;

    if !global.is_silent() {
        aprintln!();
        aprintln!("{}", p_c("Summary:"));
        for line in summary::format_summary(&result) {
            aprintln!("  {}", line);
        }

        if !result.rejected.is_empty() {
            aprintln!();
            aprintln!("{}", p_y("Skipped records:"));
            for line in summary::format_rejections(&result.rejected, REJECTIONS_SHOWN) {
                aprintln!("  {}", p_y(&line));
            }
        }

        aprintln!();
        aprintln!("{}", p_g("Expiry backfill complete."));
    }

    Ok(())
}
