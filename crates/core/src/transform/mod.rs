//! Item transformation contract.
//!
//! A transformer validates a raw item and enriches it for writing. Rejections
//! are collected per page and reported; they never abort the page.

mod error;
mod expiry;

pub use error::{RetentionOutOfRange, ValidationError};
pub use expiry::{
    parse_sort_key_timestamp, ExpiryEnricher, DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS,
};

use crate::storage::{Item, PrimaryKey};

/// Caller-supplied validation and enrichment policy.
pub trait ItemTransformer: Send + Sync {
    /// Produces the item to write, or the reason it must be skipped.
    fn transform(&self, item: Item) -> Result<Item, ValidationError>;
}

impl<F> ItemTransformer for F
where
    F: Fn(Item) -> Result<Item, ValidationError> + Send + Sync,
{
    fn transform(&self, item: Item) -> Result<Item, ValidationError> {
        self(item)
    }
}

/// An item excluded from writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Key of the rejected item, when it had a readable one.
    pub key: Option<PrimaryKey>,
    pub error: ValidationError,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}: {}", self.error),
            None => write!(f, "<no key>: {}", self.error),
        }
    }
}

/// Result of transforming one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformedPage {
    pub valid: Vec<Item>,
    pub rejected: Vec<Rejection>,
}

/// Applies `transformer` to every item, keeping page order for the valid ones.
pub fn transform_page<T>(transformer: &T, items: Vec<Item>) -> TransformedPage
where
    T: ItemTransformer + ?Sized,
{
    let mut page = TransformedPage::default();

    for item in items {
        let key = PrimaryKey::from_item(&item);
        match transformer.transform(item) {
            Ok(enriched) => page.valid.push(enriched),
            Err(error) => {
                tracing::warn!(
                    pk = key.as_ref().map(|k| k.pk.as_str()),
                    sk = key.as_ref().map(|k| k.sk.as_str()),
                    %error,
                    "Skipping item that failed validation"
                );
                page.rejected.push(Rejection { key, error });
            }
        }
    }

    page
}
