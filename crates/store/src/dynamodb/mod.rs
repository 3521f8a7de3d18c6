//! DynamoDB storage backend.
//!
//! Implements [`DocumentStore`](eip_core::storage::DocumentStore) on top of
//! `aws-sdk-dynamodb`. The client is injected so tests and tools decide how
//! it is configured.

mod conversions;
mod error;
mod expressions;
mod store;

pub use conversions::{
    attribute_to_value, attributes_to_item, item_to_attributes, value_to_attribute,
};
pub use expressions::{build_filter_expression, FilterExpression};
pub use store::DynamoDbStore;
