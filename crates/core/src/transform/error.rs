use thiserror::Error;

/// Why an item was excluded from a write batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing attribute '{0}'")]
    MissingAttribute(&'static str),
    #[error("attribute '{attribute}' is invalid: {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },
    #[error("sort key '{sk}' is not of the form <prefix>#<timestamp>")]
    MalformedSortKey { sk: String },
    #[error("sort key '{sk}' carries no ISO-8601 timestamp")]
    MissingTimestamp { sk: String },
}

/// Retention window outside the supported range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("retention of {days} days is outside 1..={max} days")]
pub struct RetentionOutOfRange {
    pub days: i64,
    pub max: i64,
}
