//! Filter expression building (pure, no I/O).

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use eip_core::storage::keys::SORT_KEY;
use eip_core::storage::ScanFilter;

/// A DynamoDB filter expression with its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Translates a [`ScanFilter`] into a filter expression.
///
/// Returns `None` for an empty filter. Attribute names always go through
/// placeholders so reserved words are safe.
pub fn build_filter_expression(filter: &ScanFilter) -> Option<FilterExpression> {
    if filter.is_empty() {
        return None;
    }

    let mut conditions = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    if let Some(prefix) = &filter.sort_key_prefix {
        conditions.push("begins_with(#sk, :sk_prefix)");
        names.insert("#sk".to_string(), SORT_KEY.to_string());
        values.insert(":sk_prefix".to_string(), AttributeValue::S(prefix.clone()));
    }

    if let Some(attribute) = &filter.missing_attribute {
        conditions.push("attribute_not_exists(#missing)");
        names.insert("#missing".to_string(), attribute.clone());
    }

    Some(FilterExpression {
        expression: conditions.join(" AND "),
        names,
        values,
    })
}
