//! Backoff batch writer.
//!
//! Persists one batch of items, resubmitting whatever the store leaves
//! unprocessed and backing off exponentially when the whole call is rejected
//! for exceeding throughput.

use std::time::Duration;

use super::error::{MaintenanceError, Result};
use crate::backoff::{BackoffPolicy, BackoffState};
use crate::storage::{DocumentStore, Item, StoreError, BATCH_WRITE_LIMIT};

/// Outcome of writing one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Items durably acknowledged by the store.
    pub written: usize,
    /// Calls made to `batch_write`.
    pub store_calls: u32,
    /// Times a partial acknowledgment led to resubmitting the remainder.
    pub resubmissions: u32,
    /// Calls rejected with `ThroughputExceeded`.
    pub throttle_events: u32,
    /// Total time spent waiting between throttled calls.
    pub total_backoff: Duration,
}

/// Writes batches of at most [`BATCH_WRITE_LIMIT`] items with retry-on-throttle.
pub struct BatchWriter<'a, S: ?Sized> {
    store: &'a S,
    policy: BackoffPolicy,
}

impl<'a, S> BatchWriter<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: &'a S, policy: BackoffPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Writes `items` to `table`, starting from the policy's initial state.
    pub async fn write(&self, table: &str, items: Vec<Item>) -> Result<WriteReport> {
        self.write_from(table, items, self.policy.start()).await
    }

    /// Writes `items` to `table`, continuing from an existing backoff state.
    ///
    /// - An empty batch returns immediately without calling the store.
    /// - Unprocessed items are resubmitted alone, keeping the current delay
    ///   and resetting the attempt count.
    /// - A throttled call waits the current delay, then resubmits every
    ///   pending item with the delay multiplied and the attempt count raised.
    /// - Reaching the attempt ceiling fails with `RetriesExhausted`; any other
    ///   store error is returned without retrying. A `state` that is already
    ///   exhausted fails before any store call.
    pub async fn write_from(
        &self,
        table: &str,
        items: Vec<Item>,
        state: BackoffState,
    ) -> Result<WriteReport> {
        let mut report = WriteReport::default();

        if items.is_empty() {
            tracing::info!(table, "No items to write, skipping batch");
            return Ok(report);
        }

        if items.len() > BATCH_WRITE_LIMIT {
            return Err(MaintenanceError::BatchTooLarge {
                size: items.len(),
                limit: BATCH_WRITE_LIMIT,
            });
        }

        if state.is_exhausted(&self.policy) {
            return Err(MaintenanceError::RetriesExhausted {
                operation: "batch_write",
                table: table.to_string(),
                attempts: state.attempt,
                last_error: StoreError::ThroughputExceeded(
                    "retry budget already spent".to_string(),
                ),
            });
        }

        let submitted = items.len();
        let mut pending = items;
        let mut state = state;

        loop {
            report.store_calls += 1;

            match self.store.batch_write(table, &pending).await {
                Ok(unprocessed) if unprocessed.is_empty() => {
                    report.written = submitted;
                    tracing::debug!(
                        table,
                        written = submitted,
                        calls = report.store_calls,
                        "Batch written"
                    );
                    return Ok(report);
                }
                Ok(unprocessed) => {
                    report.resubmissions += 1;
                    tracing::info!(
                        table,
                        unprocessed = unprocessed.len(),
                        of = pending.len(),
                        "Resubmitting unprocessed items"
                    );
                    pending = unprocessed;
                    state = state.restart();
                }
                Err(err) if err.is_throughput_exceeded() => {
                    report.throttle_events += 1;
                    tracing::warn!(
                        table,
                        attempt = state.attempt,
                        delay_ms = state.delay.as_millis() as u64,
                        items = pending.len(),
                        "Batch write throttled, backing off"
                    );
                    tokio::time::sleep(state.delay).await;
                    report.total_backoff = report.total_backoff.saturating_add(state.delay);

                    state = state.escalate(&self.policy);
                    if state.is_exhausted(&self.policy) {
                        tracing::error!(
                            table,
                            attempts = state.attempt,
                            pending = pending.len(),
                            "Batch write retries exhausted"
                        );
                        return Err(MaintenanceError::RetriesExhausted {
                            operation: "batch_write",
                            table: table.to_string(),
                            attempts: state.attempt,
                            last_error: err,
                        });
                    }
                }
                Err(err) => {
                    tracing::error!(table, error = %err, "Batch write failed");
                    return Err(err.into());
                }
            }
        }
    }
}
