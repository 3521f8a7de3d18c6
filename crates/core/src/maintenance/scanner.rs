//! Pagination driver.
//!
//! Walks a table page by page, forwarding each page's continuation key to the
//! next scan. Throttled scans are retried with the shared backoff policy.

use tokio_stream::Stream;

use super::error::Result;
use super::retry::{with_backoff, ThrottleStats};
use crate::backoff::BackoffPolicy;
use crate::storage::{ContinuationKey, DocumentStore, Page, ScanRequest};

pub struct Scanner<'a, S: ?Sized> {
    store: &'a S,
    request: ScanRequest,
    policy: BackoffPolicy,
    finished: bool,
    stats: ThrottleStats,
}

impl<'a, S> Scanner<'a, S>
where
    S: DocumentStore + ?Sized + 'a,
{
    /// Starts at `request.start_key`, or at the beginning of the table.
    pub fn new(store: &'a S, request: ScanRequest, policy: BackoffPolicy) -> Self {
        Self {
            store,
            request,
            policy,
            finished: false,
            stats: ThrottleStats::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.request.table
    }

    /// Key the next scan will start from. Persist it to restart an interrupted walk.
    pub fn resume_key(&self) -> Option<&ContinuationKey> {
        self.request.start_key.as_ref()
    }

    /// Whether the store has reported the end of the table.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> ThrottleStats {
        self.stats
    }

    /// Fetches the next page, or `None` once the table is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.finished {
            return Ok(None);
        }

        let store = self.store;
        let request = &self.request;
        let page = with_backoff(&self.policy, "scan", &request.table, &mut self.stats, || {
            store.scan(request)
        })
        .await?;

        tracing::info!(
            table = %self.request.table,
            items = page.items.len(),
            consumed_capacity = page.consumed_capacity,
            more = page.last_key.is_some(),
            "Scanned page"
        );

        self.request.start_key = page.last_key.clone();
        self.finished = page.last_key.is_none();

        Ok(Some(page))
    }

    /// Lazy stream of every remaining page.
    pub fn pages(mut self) -> impl Stream<Item = Result<Page>> + 'a {
        async_stream::try_stream! {
            while let Some(page) = self.next_page().await? {
                yield page;
            }
        }
    }
}
