use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::{PARTITION_KEY, SORT_KEY};

/// A raw stored document: attribute name to value.
pub type Item = serde_json::Map<String, Value>;

/// Maximum number of put requests accepted by a single batch write.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Composite primary key of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: String,
}

impl PrimaryKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Reads the `PK`/`SK` string attributes of an item, if both are present.
    pub fn from_item(item: &Item) -> Option<Self> {
        let pk = item.get(PARTITION_KEY)?.as_str()?;
        let sk = item.get(SORT_KEY)?.as_str()?;
        Some(Self::new(pk, sk))
    }

    /// Returns the key as an item holding only the key attributes.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(PARTITION_KEY.to_string(), Value::String(self.pk.clone()));
        item.insert(SORT_KEY.to_string(), Value::String(self.sk.clone()));
        item
    }
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

/// Opaque token identifying where a paginated scan resumes.
///
/// Holds the key attributes of the last evaluated item. It can be serialized
/// so an interrupted run can be restarted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationKey(Item);

impl ContinuationKey {
    pub fn new(attributes: Item) -> Self {
        Self(attributes)
    }

    pub fn attributes(&self) -> &Item {
        &self.0
    }

    pub fn into_attributes(self) -> Item {
        self.0
    }
}

impl From<PrimaryKey> for ContinuationKey {
    fn from(key: PrimaryKey) -> Self {
        Self(key.to_item())
    }
}

/// Declarative scan filter. Every condition that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// The item's sort key must begin with this prefix.
    pub sort_key_prefix: Option<String>,
    /// The item must not carry this attribute.
    pub missing_attribute: Option<String>,
}

impl ScanFilter {
    pub fn sort_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sort_key_prefix = Some(prefix.into());
        self
    }

    pub fn missing_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.missing_attribute = Some(attribute.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sort_key_prefix.is_none() && self.missing_attribute.is_none()
    }

    /// Evaluates the filter against an item.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(prefix) = &self.sort_key_prefix {
            let sk = item.get(SORT_KEY).and_then(Value::as_str);
            if !sk.is_some_and(|sk| sk.starts_with(prefix.as_str())) {
                return false;
            }
        }
        if let Some(attribute) = &self.missing_attribute {
            if item.contains_key(attribute) {
                return false;
            }
        }
        true
    }
}

/// Parameters of a single scan call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub table: String,
    pub filter: Option<ScanFilter>,
    pub limit: u32,
    pub start_key: Option<ContinuationKey>,
}

impl ScanRequest {
    pub fn new(table: impl Into<String>, limit: u32) -> Self {
        Self {
            table: table.into(),
            filter: None,
            limit,
            start_key: None,
        }
    }

    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_start_key(mut self, key: Option<ContinuationKey>) -> Self {
        self.start_key = key;
        self
    }
}

/// One scan response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// `None` once the table has been read to the end.
    pub last_key: Option<ContinuationKey>,
    /// Read capacity units consumed, when the store reports them.
    pub consumed_capacity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_primary_key_from_item() {
        let item = item(json!({"PK": "TARGET#1", "SK": "FAIL#2024-01-01T00:00:00Z", "x": 1}));
        assert_eq!(
            PrimaryKey::from_item(&item),
            Some(PrimaryKey::new("TARGET#1", "FAIL#2024-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_primary_key_requires_string_attributes() {
        assert_eq!(PrimaryKey::from_item(&item(json!({"PK": "A"}))), None);
        assert_eq!(PrimaryKey::from_item(&item(json!({"PK": 1, "SK": "B"}))), None);
    }

    #[test]
    fn test_filter_sort_key_prefix() {
        let filter = ScanFilter::default().sort_key_prefix("FAIL#");
        assert!(filter.matches(&item(json!({"PK": "A", "SK": "FAIL#x"}))));
        assert!(!filter.matches(&item(json!({"PK": "A", "SK": "SUB#x"}))));
        assert!(!filter.matches(&item(json!({"PK": "A"}))));
    }

    #[test]
    fn test_filter_missing_attribute() {
        let filter = ScanFilter::default().missing_attribute("expiry");
        assert!(filter.matches(&item(json!({"PK": "A", "SK": "B"}))));
        assert!(!filter.matches(&item(json!({"PK": "A", "SK": "B", "expiry": 1}))));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ScanFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&Item::new()));
    }

    #[test]
    fn test_continuation_key_serializes_as_attribute_map() {
        let key = ContinuationKey::from(PrimaryKey::new("A", "B"));
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json, json!({"PK": "A", "SK": "B"}));
        let back: ContinuationKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }
}
