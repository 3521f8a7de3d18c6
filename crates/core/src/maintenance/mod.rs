//! Batch maintenance over a throughput-limited document store.
//!
//! [`Scanner`] paginates a table, an [`ItemTransformer`](crate::transform::ItemTransformer)
//! validates and enriches each page, and [`BatchWriter`] persists the result
//! with exponential backoff. [`run_maintenance`] ties the three together.

mod error;
mod pipeline;
mod retry;
mod scanner;
#[cfg(test)]
pub(crate) mod testing;
mod writer;

pub use error::{MaintenanceError, Result};
pub use pipeline::{run_maintenance, RunSummary};
pub use retry::{with_backoff, ThrottleStats};
pub use scanner::Scanner;
pub use writer::{BatchWriter, WriteReport};
