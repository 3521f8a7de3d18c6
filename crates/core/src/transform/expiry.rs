//! Expiry enrichment for delivery-failure records.
//!
//! Failure records embed their creation time in the sort key
//! (`FAIL#2023-01-01T00:00:00Z`). The enricher validates the key attributes
//! and writes an `expiry` attribute (unix seconds) so the store's TTL sweeper
//! removes the record once the retention window has passed.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use super::{ItemTransformer, RetentionOutOfRange, ValidationError};
use crate::storage::keys::{EXPIRY_ATTRIBUTE, KEY_SEPARATOR, PARTITION_KEY, SORT_KEY};
use crate::storage::Item;

/// Days a failure record is kept before it expires.
pub const DEFAULT_RETENTION_DAYS: i64 = 60;
/// Longest accepted retention window (100 years).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Naive timestamp layouts accepted when the sort key carries no offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Validates failure records and derives their expiration attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryEnricher {
    attribute: String,
    retention: TimeDelta,
}

impl Default for ExpiryEnricher {
    fn default() -> Self {
        Self {
            attribute: EXPIRY_ATTRIBUTE.to_string(),
            retention: TimeDelta::days(DEFAULT_RETENTION_DAYS),
        }
    }
}

impl ExpiryEnricher {
    pub fn new(attribute: impl Into<String>, retention: TimeDelta) -> Self {
        Self {
            attribute: attribute.into(),
            retention,
        }
    }

    /// Sets the retention window in days, between 1 and [`MAX_RETENTION_DAYS`].
    pub fn with_retention_days(mut self, days: i64) -> Result<Self, RetentionOutOfRange> {
        self.retention = Some(days)
            .filter(|days| (1..=MAX_RETENTION_DAYS).contains(days))
            .and_then(TimeDelta::try_days)
            .ok_or(RetentionOutOfRange {
                days,
                max: MAX_RETENTION_DAYS,
            })?;
        Ok(self)
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn retention(&self) -> TimeDelta {
        self.retention
    }

    /// `floor(timestamp in seconds) + retention in seconds`.
    pub fn expiry_for(&self, timestamp: DateTime<Utc>) -> i64 {
        timestamp
            .timestamp()
            .saturating_add(self.retention.num_seconds())
    }
}

impl ItemTransformer for ExpiryEnricher {
    fn transform(&self, mut item: Item) -> Result<Item, ValidationError> {
        require_string(&item, PARTITION_KEY)?;
        let sk = require_string(&item, SORT_KEY)?;
        let timestamp = parse_sort_key_timestamp(sk)?;

        let expiry = self.expiry_for(timestamp);
        item.insert(self.attribute.clone(), Value::from(expiry));
        Ok(item)
    }
}

/// Extracts the timestamp embedded in a `<prefix>#<timestamp>` sort key.
///
/// The first segment after the prefix that parses as an ISO-8601 timestamp
/// wins; naive timestamps are read as UTC.
pub fn parse_sort_key_timestamp(sk: &str) -> Result<DateTime<Utc>, ValidationError> {
    let mut segments = sk.split(KEY_SEPARATOR);
    let prefix = segments.next().unwrap_or_default();
    let rest: Vec<&str> = segments.collect();

    if prefix.is_empty() || rest.is_empty() {
        return Err(ValidationError::MalformedSortKey { sk: sk.to_string() });
    }

    rest.iter()
        .find_map(|segment| parse_timestamp(segment))
        .ok_or_else(|| ValidationError::MissingTimestamp { sk: sk.to_string() })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn require_string<'a>(item: &'a Item, attribute: &'static str) -> Result<&'a str, ValidationError> {
    match item.get(attribute) {
        None | Some(Value::Null) => Err(ValidationError::MissingAttribute(attribute)),
        Some(Value::String(value)) if value.is_empty() => Err(ValidationError::InvalidAttribute {
            attribute,
            reason: "empty string".to_string(),
        }),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(ValidationError::InvalidAttribute {
            attribute,
            reason: format!("expected a string, found {other}"),
        }),
    }
}
