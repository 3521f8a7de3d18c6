use async_trait::async_trait;

use super::{Item, Page, Result, ScanRequest};

/// A paginated, throughput-limited key-value document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one page of a table.
    async fn scan(&self, request: &ScanRequest) -> Result<Page>;

    /// Puts every item in a single multi-item write.
    ///
    /// Returns the items the store could not apply. A non-empty result is a
    /// normal partial acknowledgment, not an error.
    async fn batch_write(&self, table: &str, items: &[Item]) -> Result<Vec<Item>>;
}
