//! DynamoDB attribute conversion functions.
//!
//! Pure functions converting between JSON items and DynamoDB `AttributeValue`
//! maps. These are testable in isolation without DynamoDB access.
//!
//! Conversion is lossless in both directions, so a record read by a scan can
//! be put back unchanged apart from what the caller modified:
//!
//! - `N` keeps its decimal text (serde_json `arbitrary_precision`).
//! - Types JSON has no equivalent for are tagged single-key objects:
//!   `{"$SS": [..]}`, `{"$NS": ["1", ..]}`, `{"$B": "<base64>"}` and
//!   `{"$BS": ["<base64>", ..]}`.
//! - A stored map that happens to look like a tag is wrapped as
//!   `{"$M": {..}}`.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use eip_core::storage::{Item, StoreError};
use serde_json::{Map, Number, Value};

const BINARY_TAG: &str = "$B";
const STRING_SET_TAG: &str = "$SS";
const NUMBER_SET_TAG: &str = "$NS";
const BINARY_SET_TAG: &str = "$BS";
const MAP_TAG: &str = "$M";

const TAGS: &[&str] = &[
    BINARY_TAG,
    STRING_SET_TAG,
    NUMBER_SET_TAG,
    BINARY_SET_TAG,
    MAP_TAG,
];

/// Convert a JSON item to a DynamoDB attribute map.
pub fn item_to_attributes(item: &Item) -> Result<HashMap<String, AttributeValue>, StoreError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), value_to_attribute(value)?)))
        .collect()
}

/// Convert a DynamoDB attribute map to a JSON item.
pub fn attributes_to_item(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<Item, StoreError> {
    attributes
        .iter()
        .map(|(name, attribute)| Ok((name.clone(), attribute_to_value(attribute)?)))
        .collect()
}

/// Convert a JSON value to an `AttributeValue`.
pub fn value_to_attribute(value: &Value) -> Result<AttributeValue, StoreError> {
    Ok(match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(
            values
                .iter()
                .map(value_to_attribute)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => match tag_of(map) {
            Some((tag, inner)) => tagged_to_attribute(tag, inner)?,
            None => AttributeValue::M(item_to_attributes(map)?),
        },
    })
}

/// Convert an `AttributeValue` to a JSON value.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, StoreError> {
    Ok(match attribute {
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::N(number) => Value::Number(parse_number(number)?),
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(attribute_to_value)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => {
            let inner = attributes_to_item(map)?;
            if tag_of(&inner).is_some() {
                tagged(MAP_TAG, Value::Object(inner))
            } else {
                Value::Object(inner)
            }
        }
        AttributeValue::Ss(texts) => tagged(
            STRING_SET_TAG,
            texts.iter().cloned().map(Value::String).collect(),
        ),
        AttributeValue::Ns(numbers) => {
            for number in numbers {
                parse_number(number)?;
            }
            tagged(
                NUMBER_SET_TAG,
                numbers.iter().cloned().map(Value::String).collect(),
            )
        }
        AttributeValue::B(blob) => tagged(BINARY_TAG, Value::String(STANDARD.encode(blob))),
        AttributeValue::Bs(blobs) => tagged(
            BINARY_SET_TAG,
            blobs
                .iter()
                .map(|blob| Value::String(STANDARD.encode(blob)))
                .collect(),
        ),
        other => {
            return Err(StoreError::Serialization(format!(
                "Unsupported attribute value: {other:?}"
            )))
        }
    })
}

/// The tag and payload of a single-key object whose key is a known tag.
fn tag_of(map: &Map<String, Value>) -> Option<(&str, &Value)> {
    if map.len() != 1 {
        return None;
    }
    map.iter()
        .next()
        .filter(|(key, _)| TAGS.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value))
}

fn tagged(tag: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(tag.to_string(), value);
    Value::Object(map)
}

fn tagged_to_attribute(tag: &str, value: &Value) -> Result<AttributeValue, StoreError> {
    Ok(match tag {
        BINARY_TAG => AttributeValue::B(decode_blob(tag, value)?),
        STRING_SET_TAG => AttributeValue::Ss(strings(tag, value)?),
        NUMBER_SET_TAG => {
            let numbers = strings(tag, value)?;
            for number in &numbers {
                parse_number(number)?;
            }
            AttributeValue::Ns(numbers)
        }
        BINARY_SET_TAG => AttributeValue::Bs(
            array(tag, value)?
                .iter()
                .map(|blob| decode_blob(tag, blob))
                .collect::<Result<_, _>>()?,
        ),
        _ => match value {
            Value::Object(map) => AttributeValue::M(item_to_attributes(map)?),
            _ => return Err(malformed(tag, "an object")),
        },
    })
}

fn array<'a>(tag: &str, value: &'a Value) -> Result<&'a Vec<Value>, StoreError> {
    value.as_array().ok_or_else(|| malformed(tag, "an array"))
}

fn strings(tag: &str, value: &Value) -> Result<Vec<String>, StoreError> {
    array(tag, value)?
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(tag, "an array of strings"))
        })
        .collect()
}

fn decode_blob(tag: &str, value: &Value) -> Result<Blob, StoreError> {
    let encoded = value.as_str().ok_or_else(|| malformed(tag, "base64 text"))?;
    STANDARD
        .decode(encoded)
        .map(Blob::new)
        .map_err(|e| StoreError::Serialization(format!("Invalid base64 in '{tag}': {e}")))
}

fn malformed(tag: &str, expected: &str) -> StoreError {
    StoreError::Serialization(format!("'{tag}' must hold {expected}"))
}

fn parse_number(number: &str) -> Result<Number, StoreError> {
    number
        .parse::<Number>()
        .map_err(|e| StoreError::Serialization(format!("Invalid number '{number}': {e}")))
}
