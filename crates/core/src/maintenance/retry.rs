//! Retry-on-throttle wrapper shared by the scanner and other single-shot calls.

use std::future::Future;
use std::time::Duration;

use super::error::{MaintenanceError, Result};
use crate::backoff::BackoffPolicy;
use crate::storage::StoreError;

/// Throttling observed while running an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleStats {
    pub throttle_events: u32,
    pub total_backoff: Duration,
}

impl ThrottleStats {
    pub(crate) fn record(&mut self, delay: Duration) {
        self.throttle_events += 1;
        self.total_backoff = self.total_backoff.saturating_add(delay);
    }

    pub fn merge(&mut self, other: ThrottleStats) {
        self.throttle_events += other.throttle_events;
        self.total_backoff = self.total_backoff.saturating_add(other.total_backoff);
    }
}

/// Runs `call`, retrying it with exponential backoff while the store reports
/// `ThroughputExceeded`.
///
/// Other errors propagate on first occurrence. Once the attempt ceiling is
/// reached the last throttling error is returned inside `RetriesExhausted`.
pub async fn with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    operation: &'static str,
    table: &str,
    stats: &mut ThrottleStats,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, StoreError>>,
{
    let mut state = policy.start();

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_throughput_exceeded() => {
                tracing::warn!(
                    operation,
                    table,
                    attempt = state.attempt,
                    delay_ms = state.delay.as_millis() as u64,
                    "Throughput exceeded, backing off"
                );
                tokio::time::sleep(state.delay).await;
                stats.record(state.delay);

                state = state.escalate(policy);
                if state.is_exhausted(policy) {
                    tracing::error!(
                        operation,
                        table,
                        attempts = state.attempt,
                        "Retries exhausted"
                    );
                    return Err(MaintenanceError::RetriesExhausted {
                        operation,
                        table: table.to_string(),
                        attempts: state.attempt,
                        last_error: err,
                    });
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}
