//! Document store backends.
//!
//! Implementations of [`eip_core::storage::DocumentStore`], selected with
//! feature flags. Both can be enabled at once.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local store that can simulate throttling
//!   and partial acknowledgment
//! - `dynamodb`: AWS DynamoDB store using `aws-sdk-dynamodb`
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p eip_store --features dynamodb
//! ```

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No store backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p eip_store --features dynamodb"
);

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
