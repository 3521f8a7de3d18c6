//! Maintenance configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use eip_core::backoff::{BackoffPolicy, DEFAULT_MAX_ATTEMPTS};
use eip_core::transform::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};

/// Default table holding delivery-failure records.
pub const DEFAULT_FAILURES_TABLE: &str = "eip-delivery-failures";
/// Default number of items evaluated per scan page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_BACKOFF_INITIAL_MS: u64 = 1000;

/// Settings shared by the maintenance routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfig {
    /// Table holding failure records (default: "eip-delivery-failures")
    pub table_name: String,
    /// Items evaluated per scan page (default: 100)
    pub page_size: u32,
    /// First backoff wait in milliseconds (default: 1000)
    pub backoff_initial_ms: u64,
    /// Throttled attempts before giving up (default: 10)
    pub backoff_max_attempts: u32,
    /// Days a failure record is retained (default: 60)
    pub retention_days: i64,
}

impl MaintenanceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EIP_FAILURES_TABLE` - Failure records table (default: "eip-delivery-failures")
    /// - `EIP_SCAN_PAGE_SIZE` - Items per scan page (default: 100)
    /// - `EIP_BACKOFF_INITIAL_MS` - First backoff wait (default: 1000)
    /// - `EIP_BACKOFF_MAX_ATTEMPTS` - Attempt ceiling (default: 10)
    /// - `EIP_FAILURE_RETENTION_DAYS` - Retention window (default: 60)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name: lookup("EIP_FAILURES_TABLE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURES_TABLE.to_string()),
            page_size: lookup("EIP_SCAN_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            backoff_initial_ms: lookup("EIP_BACKOFF_INITIAL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BACKOFF_INITIAL_MS),
            backoff_max_attempts: lookup("EIP_BACKOFF_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retention_days: lookup("EIP_FAILURE_RETENTION_DAYS")
                .and_then(|v| v.parse().ok())
                .filter(|v| (1..=MAX_RETENTION_DAYS).contains(v))
                .unwrap_or(DEFAULT_RETENTION_DAYS),
        }
    }

    /// Backoff policy built from the configured delay and attempt ceiling.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::default()
            .with_initial_delay(Duration::from_millis(self.backoff_initial_ms))
            .with_max_attempts(self.backoff_max_attempts)
    }
}
