//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use eip_core::storage::{
    DocumentStore, Item, Page, PrimaryKey, Result, ScanRequest, StoreError, BATCH_WRITE_LIMIT,
};

/// Read capacity charged per evaluated item (eventually consistent, ≤ 4 KB).
const READ_UNITS_PER_ITEM: f64 = 0.5;

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, BTreeMap<PrimaryKey, Item>>,
    /// Items acknowledged per batch write; `None` acknowledges everything.
    write_capacity: Option<usize>,
    pending_write_throttles: u32,
    pending_scan_throttles: u32,
    write_calls: u32,
    scan_calls: u32,
}

/// In-memory storage backend for testing.
///
/// Tables are ordered by `(PK, SK)` so scans are deterministic. Data is not
/// persisted and is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new store without tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table; existing tables are left untouched.
    pub async fn create_table(&self, table: &str) {
        let mut state = self.state.write().await;
        state.tables.entry(table.to_string()).or_default();
    }

    /// Upserts items directly, bypassing capacity limits and throttling.
    pub async fn put_items(&self, table: &str, items: Vec<Item>) -> Result<()> {
        let mut state = self.state.write().await;
        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(table))?;
        for item in items {
            let key = key_of(&item)?;
            rows.insert(key, item);
        }
        Ok(())
    }

    /// Every item of a table in key order.
    pub async fn items(&self, table: &str) -> Result<Vec<Item>> {
        let state = self.state.read().await;
        let rows = state.tables.get(table).ok_or_else(|| table_not_found(table))?;
        Ok(rows.values().cloned().collect())
    }

    /// Limits how many items each batch write acknowledges; the rest come
    /// back as unprocessed.
    pub async fn set_write_capacity(&self, capacity: Option<usize>) {
        self.state.write().await.write_capacity = capacity;
    }

    /// Fails the next `count` batch writes with `ThroughputExceeded`.
    pub async fn throttle_next_writes(&self, count: u32) {
        self.state.write().await.pending_write_throttles = count;
    }

    /// Fails the next `count` scans with `ThroughputExceeded`.
    pub async fn throttle_next_scans(&self, count: u32) {
        self.state.write().await.pending_scan_throttles = count;
    }

    /// Batch write calls received so far, throttled ones included.
    pub async fn write_calls(&self) -> u32 {
        self.state.read().await.write_calls
    }

    /// Scan calls received so far, throttled ones included.
    pub async fn scan_calls(&self) -> u32 {
        self.state.read().await.scan_calls
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn scan(&self, request: &ScanRequest) -> Result<Page> {
        let mut state = self.state.write().await;
        state.scan_calls += 1;

        if state.pending_scan_throttles > 0 {
            state.pending_scan_throttles -= 1;
            return Err(StoreError::ThroughputExceeded(
                "simulated read throttling".to_string(),
            ));
        }

        if request.limit == 0 {
            return Err(StoreError::InvalidRequest(
                "Limit must be at least 1".to_string(),
            ));
        }

        let rows = state
            .tables
            .get(&request.table)
            .ok_or_else(|| table_not_found(&request.table))?;

        let lower = match &request.start_key {
            Some(start) => Bound::Excluded(PrimaryKey::from_item(start.attributes()).ok_or_else(
                || StoreError::InvalidRequest("start key must carry PK and SK".to_string()),
            )?),
            None => Bound::Unbounded,
        };

        let limit = request.limit as usize;
        let mut evaluated = 0usize;
        let mut last_evaluated = None;
        let mut items = Vec::new();

        for (key, item) in rows.range((lower, Bound::Unbounded)).take(limit) {
            evaluated += 1;
            last_evaluated = Some(key.clone());
            let keep = request
                .filter
                .as_ref()
                .map_or(true, |filter| filter.matches(item));
            if keep {
                items.push(item.clone());
            }
        }

        // Like DynamoDB, a page that stopped at the limit reports its last
        // evaluated key even if nothing follows it.
        let last_key = if evaluated == limit {
            last_evaluated.map(Into::into)
        } else {
            None
        };

        Ok(Page {
            items,
            last_key,
            consumed_capacity: Some(evaluated as f64 * READ_UNITS_PER_ITEM),
        })
    }

    async fn batch_write(&self, table: &str, items: &[Item]) -> Result<Vec<Item>> {
        let mut state = self.state.write().await;
        state.write_calls += 1;

        if items.is_empty() || items.len() > BATCH_WRITE_LIMIT {
            return Err(StoreError::InvalidRequest(format!(
                "batch write must hold between 1 and {BATCH_WRITE_LIMIT} items, got {}",
                items.len()
            )));
        }

        let keys = items.iter().map(key_of).collect::<Result<Vec<_>>>()?;
        let distinct: HashSet<&PrimaryKey> = keys.iter().collect();
        if distinct.len() != keys.len() {
            return Err(StoreError::InvalidRequest(
                "Provided list of item keys contains duplicates".to_string(),
            ));
        }

        if !state.tables.contains_key(table) {
            return Err(table_not_found(table));
        }

        if state.pending_write_throttles > 0 {
            state.pending_write_throttles -= 1;
            return Err(StoreError::ThroughputExceeded(
                "simulated write throttling".to_string(),
            ));
        }

        let accepted = state.write_capacity.unwrap_or(items.len()).min(items.len());
        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(table))?;
        for (key, item) in keys.into_iter().zip(items).take(accepted) {
            rows.insert(key, item.clone());
        }

        Ok(items[accepted..].to_vec())
    }
}

fn key_of(item: &Item) -> Result<PrimaryKey> {
    PrimaryKey::from_item(item)
        .ok_or_else(|| StoreError::InvalidRequest("item must carry string PK and SK".to_string()))
}

fn table_not_found(table: &str) -> StoreError {
    StoreError::TableNotFound {
        table: table.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eip_core::backoff::BackoffPolicy;
    use eip_core::maintenance::{run_maintenance, BatchWriter, MaintenanceError};
    use eip_core::storage::ScanFilter;
    use eip_core::transform::ExpiryEnricher;
    use serde_json::{json, Value};

    const TABLE: &str = "eip-delivery-failures";

    fn item(value: Value) -> Item {
        value.as_object().unwrap().clone()
    }

    fn failure(i: usize) -> Item {
        item(json!({
            "PK": format!("TARGET#{i:03}"),
            "SK": format!("FAIL#2024-03-01T10:{:02}:00Z", i % 60),
            "statusCode": 503,
        }))
    }

    async fn seeded(count: usize) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create_table(TABLE).await;
        store
            .put_items(TABLE, (0..count).map(failure).collect())
            .await
            .unwrap();
        store
    }

    // ==================== Store behavior ====================

    #[tokio::test]
    async fn test_put_is_idempotent_by_key() {
        let store = InMemoryStore::new();
        store.create_table(TABLE).await;

        let record = failure(1);
        store.batch_write(TABLE, &[record.clone()]).await.unwrap();
        let once = store.items(TABLE).await.unwrap();
        store.batch_write(TABLE, &[record]).await.unwrap();
        let twice = store.items(TABLE).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_item() {
        let store = seeded(1).await;
        let mut updated = failure(0);
        updated.insert("expiry".to_string(), json!(1));

        store.batch_write(TABLE, &[updated.clone()]).await.unwrap();

        assert_eq!(store.items(TABLE).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_scan_paginates_in_key_order() {
        let store = seeded(5).await;
        let mut request = ScanRequest::new(TABLE, 2);
        let mut seen = Vec::new();

        loop {
            let page = store.scan(&request).await.unwrap();
            seen.extend(page.items.iter().filter_map(PrimaryKey::from_item));
            match page.last_key {
                Some(key) => request = request.with_start_key(Some(key)),
                None => break,
            }
        }

        let expected: Vec<PrimaryKey> = (0..5)
            .map(|i| PrimaryKey::from_item(&failure(i)).unwrap())
            .collect();
        assert_eq!(seen, expected);
        assert_eq!(store.scan_calls().await, 3);
    }

    #[tokio::test]
    async fn test_limit_applies_before_filter() {
        let store = seeded(4).await;
        let mut done = failure(1);
        done.insert("expiry".to_string(), json!(1));
        store.put_items(TABLE, vec![done]).await.unwrap();

        let request = ScanRequest::new(TABLE, 2)
            .with_filter(ScanFilter::default().missing_attribute("expiry"));
        let page = store.scan(&request).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(page.last_key.is_some());
        assert_eq!(page.consumed_capacity, Some(1.0));
    }

    #[tokio::test]
    async fn test_page_ending_at_limit_reports_last_key() {
        let store = seeded(2).await;

        let first = store.scan(&ScanRequest::new(TABLE, 2)).await.unwrap();
        assert!(first.last_key.is_some());

        let second = store
            .scan(&ScanRequest::new(TABLE, 2).with_start_key(first.last_key))
            .await
            .unwrap();
        assert!(second.items.is_empty());
        assert!(second.last_key.is_none());
    }

    #[tokio::test]
    async fn test_scan_unknown_table() {
        let store = InMemoryStore::new();
        let err = store.scan(&ScanRequest::new("missing", 10)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::TableNotFound {
                table: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_batch_write_rejects_oversized_and_duplicate_batches() {
        let store = seeded(0).await;

        let too_many: Vec<Item> = (0..26).map(failure).collect();
        assert!(matches!(
            store.batch_write(TABLE, &too_many).await,
            Err(StoreError::InvalidRequest(_))
        ));

        assert!(matches!(
            store.batch_write(TABLE, &[failure(1), failure(1)]).await,
            Err(StoreError::InvalidRequest(_))
        ));

        assert!(matches!(
            store.batch_write(TABLE, &[item(json!({"PK": "only"}))]).await,
            Err(StoreError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_write_capacity_returns_unprocessed_items() {
        let store = seeded(0).await;
        store.set_write_capacity(Some(3)).await;
        let batch: Vec<Item> = (0..5).map(failure).collect();

        let unprocessed = store.batch_write(TABLE, &batch).await.unwrap();

        assert_eq!(unprocessed, batch[3..].to_vec());
        assert_eq!(store.items(TABLE).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_simulated_throttling() {
        let store = seeded(1).await;
        store.throttle_next_writes(1).await;
        store.throttle_next_scans(1).await;

        assert!(store
            .batch_write(TABLE, &[failure(2)])
            .await
            .unwrap_err()
            .is_throughput_exceeded());
        assert!(store.batch_write(TABLE, &[failure(2)]).await.unwrap().is_empty());

        assert!(store
            .scan(&ScanRequest::new(TABLE, 10))
            .await
            .unwrap_err()
            .is_throughput_exceeded());
        assert_eq!(store.scan(&ScanRequest::new(TABLE, 10)).await.unwrap().items.len(), 2);
    }

    // ==================== Maintenance over the in-memory store ====================

    #[tokio::test(start_paused = true)]
    async fn test_update_ttl_run_enriches_every_failure() {
        let store = seeded(60).await;
        store.set_write_capacity(Some(10)).await;
        store.throttle_next_writes(2).await;
        store.throttle_next_scans(1).await;

        let request = ScanRequest::new(TABLE, 30).with_filter(
            ScanFilter::default()
                .sort_key_prefix("FAIL#")
                .missing_attribute("expiry"),
        );
        let summary = run_maintenance(
            &store,
            request,
            &ExpiryEnricher::default(),
            BackoffPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.written, 60);
        assert!(summary.rejected.is_empty());
        assert_eq!(summary.throttle_events, 3);
        assert!(summary.resubmissions > 0);

        let items = store.items(TABLE).await.unwrap();
        assert_eq!(items.len(), 60);
        assert!(items.iter().all(|item| item["expiry"].is_i64()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_finds_nothing_to_update() {
        let store = seeded(10).await;
        let request = ScanRequest::new(TABLE, 100).with_filter(
            ScanFilter::default()
                .sort_key_prefix("FAIL#")
                .missing_attribute("expiry"),
        );
        let enricher = ExpiryEnricher::default();

        run_maintenance(&store, request.clone(), &enricher, BackoffPolicy::default())
            .await
            .unwrap();
        let before = store.write_calls().await;
        let second = run_maintenance(&store, request, &enricher, BackoffPolicy::default())
            .await
            .unwrap();

        assert_eq!(second.scanned, 0);
        assert_eq!(store.write_calls().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writer_exhausts_against_persistent_throttling() {
        let store = seeded(0).await;
        store.throttle_next_writes(u32::MAX).await;
        let writer = BatchWriter::new(&store, BackoffPolicy::default());

        let err = writer.write(TABLE, vec![failure(1)]).await.unwrap_err();

        assert!(matches!(err, MaintenanceError::RetriesExhausted { attempts: 10, .. }));
        assert_eq!(store.write_calls().await, 10);
        assert!(store.items(TABLE).await.unwrap().is_empty());
    }
}
