//! Attribute names and sort key prefixes of the single-table design.

/// Partition key attribute.
pub const PARTITION_KEY: &str = "PK";
/// Sort key attribute.
pub const SORT_KEY: &str = "SK";

/// Separator between sort key segments.
pub const KEY_SEPARATOR: char = '#';

/// Sort key prefix of delivery-failure records: `FAIL#<timestamp>`.
pub const FAILURE_PREFIX: &str = "FAIL#";

/// Attribute holding the expiration time (unix seconds) read by the store's TTL sweeper.
pub const EXPIRY_ATTRIBUTE: &str = "expiry";
