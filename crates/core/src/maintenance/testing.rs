//! Scripted store used by the maintenance tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::{Duration, Instant};

use crate::storage::{DocumentStore, Item, Page, Result, ScanRequest, StoreError};

/// Scripted response to one `batch_write` call.
#[derive(Debug, Clone)]
pub enum WriteStep {
    /// Persist the first `n` items and return the rest as unprocessed.
    Acknowledge(usize),
    Throttle,
    Fail(StoreError),
}

/// Scripted response to one `scan` call.
#[derive(Debug, Clone)]
pub enum ScanStep {
    Page(Page),
    Throttle,
    Fail(StoreError),
}

/// Store that replays scripted responses; once a script runs out every write
/// is fully acknowledged and every scan returns an empty last page.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    writes: Mutex<VecDeque<WriteStep>>,
    scans: Mutex<VecDeque<ScanStep>>,
    always_throttle_writes: bool,
    write_log: Mutex<Vec<(Instant, Vec<Item>)>>,
    scan_log: Mutex<Vec<ScanRequest>>,
}

impl ScriptedStore {
    pub fn with_writes(self, steps: Vec<WriteStep>) -> Self {
        *self.writes.lock().unwrap() = steps.into();
        self
    }

    pub fn with_scans(self, steps: Vec<ScanStep>) -> Self {
        *self.scans.lock().unwrap() = steps.into();
        self
    }

    pub fn always_throttle_writes(mut self) -> Self {
        self.always_throttle_writes = true;
        self
    }

    /// Items submitted by each `batch_write` call, in order.
    pub fn write_calls(&self) -> Vec<Vec<Item>> {
        self.write_log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, items)| items.clone())
            .collect()
    }

    /// Time elapsed between consecutive `batch_write` calls.
    pub fn write_call_gaps(&self) -> Vec<Duration> {
        let log = self.write_log.lock().unwrap();
        log.windows(2).map(|pair| pair[1].0 - pair[0].0).collect()
    }

    pub fn scan_calls(&self) -> Vec<ScanRequest> {
        self.scan_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn scan(&self, request: &ScanRequest) -> Result<Page> {
        self.scan_log.lock().unwrap().push(request.clone());
        match self.scans.lock().unwrap().pop_front() {
            Some(ScanStep::Page(page)) => Ok(page),
            Some(ScanStep::Throttle) => Err(throttled()),
            Some(ScanStep::Fail(err)) => Err(err),
            None => Ok(Page::default()),
        }
    }

    async fn batch_write(&self, _table: &str, items: &[Item]) -> Result<Vec<Item>> {
        self.write_log
            .lock()
            .unwrap()
            .push((Instant::now(), items.to_vec()));

        if self.always_throttle_writes {
            return Err(throttled());
        }

        match self.writes.lock().unwrap().pop_front() {
            Some(WriteStep::Acknowledge(n)) => Ok(items[n.min(items.len())..].to_vec()),
            Some(WriteStep::Throttle) => Err(throttled()),
            Some(WriteStep::Fail(err)) => Err(err),
            None => Ok(Vec::new()),
        }
    }
}

fn throttled() -> StoreError {
    StoreError::ThroughputExceeded("scripted throttle".to_string())
}

/// Failure record with a parseable timestamp in its sort key.
pub fn failure_item(i: usize) -> Item {
    json!({
        "PK": format!("TARGET#{i}"),
        "SK": format!("FAIL#2024-01-01T{:02}:{:02}:00Z", (i / 60) % 24, i % 60),
        "status": 500,
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

/// `n` valid failure records.
pub fn failure_items(n: usize) -> Vec<Item> {
    (0..n).map(failure_item).collect()
}

/// Failure record whose sort key has no timestamp.
pub fn malformed_item(i: usize) -> Item {
    json!({"PK": format!("TARGET#{i}"), "SK": "FAIL#unknown"})
        .as_object()
        .cloned()
        .unwrap_or_default()
}
