mod error;
pub mod keys;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::DocumentStore;
pub use types::{
    ContinuationKey, Item, Page, PrimaryKey, ScanFilter, ScanRequest, BATCH_WRITE_LIMIT,
};
