//! Scan, transform and rewrite every matching item of a table.

use std::time::Duration;

use super::error::Result;
use super::scanner::Scanner;
use super::writer::{BatchWriter, WriteReport};
use crate::backoff::BackoffPolicy;
use crate::storage::{DocumentStore, Item, ScanRequest, BATCH_WRITE_LIMIT};
use crate::transform::{transform_page, ItemTransformer, Rejection};

/// Totals of a completed maintenance run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub pages: usize,
    pub scanned: usize,
    pub written: usize,
    pub rejected: Vec<Rejection>,
    /// `batch_write` calls, retries included.
    pub store_calls: u32,
    pub resubmissions: u32,
    /// Throttled scans and writes.
    pub throttle_events: u32,
    pub total_backoff: Duration,
    /// Read capacity units reported by the store.
    pub consumed_capacity: f64,
}

impl RunSummary {
    fn absorb(&mut self, report: WriteReport) {
        self.written += report.written;
        self.store_calls += report.store_calls;
        self.resubmissions += report.resubmissions;
        self.throttle_events += report.throttle_events;
        self.total_backoff = self.total_backoff.saturating_add(report.total_backoff);
    }
}

/// Runs `transformer` over every item the scan yields and writes the results back.
///
/// Pages are processed strictly in order: the next page is fetched only after
/// every batch of the current one, retries included, has been written. Items
/// rejected by the transformer are collected in the summary. Exhausted retries
/// and non-throttling store errors abort the run.
pub async fn run_maintenance<S, T>(
    store: &S,
    request: ScanRequest,
    transformer: &T,
    policy: BackoffPolicy,
) -> Result<RunSummary>
where
    S: DocumentStore + ?Sized,
    T: ItemTransformer + ?Sized,
{
    let table = request.table.clone();
    let mut scanner = Scanner::new(store, request, policy);
    let writer = BatchWriter::new(store, policy);
    let mut summary = RunSummary::default();

    while let Some(page) = scanner.next_page().await? {
        summary.pages += 1;
        summary.scanned += page.items.len();
        summary.consumed_capacity += page.consumed_capacity.unwrap_or_default();

        let transformed = transform_page(transformer, page.items);
        if transformed.valid.is_empty() {
            tracing::info!(
                table = %table,
                page = summary.pages,
                rejected = transformed.rejected.len(),
                "No valid items in page, nothing to write"
            );
        }

        for batch in into_batches(transformed.valid, BATCH_WRITE_LIMIT) {
            let report = writer.write(&table, batch).await?;
            summary.absorb(report);
        }
        summary.rejected.extend(transformed.rejected);
    }

    let scan_stats = scanner.stats();
    summary.throttle_events += scan_stats.throttle_events;
    summary.total_backoff = summary.total_backoff.saturating_add(scan_stats.total_backoff);

    tracing::info!(
        table = %table,
        pages = summary.pages,
        scanned = summary.scanned,
        written = summary.written,
        rejected = summary.rejected.len(),
        throttle_events = summary.throttle_events,
        "Maintenance run complete"
    );

    Ok(summary)
}

/// Splits `items` into consecutive batches of at most `size`, keeping order.
fn into_batches(mut items: Vec<Item>, size: usize) -> Vec<Vec<Item>> {
    let mut batches = Vec::with_capacity(items.len().div_ceil(size.max(1)));
    while !items.is_empty() {
        let rest = items.split_off(size.max(1).min(items.len()));
        batches.push(std::mem::replace(&mut items, rest));
    }
    batches
}
