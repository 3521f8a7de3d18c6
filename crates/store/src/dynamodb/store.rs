//! DynamoDB store implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{PutRequest, ReturnConsumedCapacity, WriteRequest};
use aws_sdk_dynamodb::Client;

use eip_core::storage::{
    ContinuationKey, DocumentStore, Item, Page, Result, ScanRequest, StoreError,
};

use super::conversions::{attributes_to_item, item_to_attributes};
use super::error::{map_batch_write_error, map_scan_error};
use super::expressions::build_filter_expression;

/// DynamoDB-based document store.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a store around an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for DynamoDbStore {
    async fn scan(&self, request: &ScanRequest) -> Result<Page> {
        let mut builder = self
            .client
            .scan()
            .table_name(&request.table)
            .limit(i32::try_from(request.limit).unwrap_or(i32::MAX))
            .return_consumed_capacity(ReturnConsumedCapacity::Total);

        if let Some(start) = &request.start_key {
            builder =
                builder.set_exclusive_start_key(Some(item_to_attributes(start.attributes())?));
        }

        if let Some(filter) = request.filter.as_ref().and_then(build_filter_expression) {
            builder = builder
                .filter_expression(filter.expression)
                .set_expression_attribute_names(Some(filter.names));
            if !filter.values.is_empty() {
                builder = builder.set_expression_attribute_values(Some(filter.values));
            }
        }

        let output = builder
            .send()
            .await
            .map_err(|e| map_scan_error(e, &request.table))?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()?;

        let last_key = match output.last_evaluated_key {
            Some(key) if !key.is_empty() => Some(ContinuationKey::new(attributes_to_item(&key)?)),
            _ => None,
        };

        Ok(Page {
            items,
            last_key,
            consumed_capacity: output.consumed_capacity.and_then(|c| c.capacity_units),
        })
    }

    async fn batch_write(&self, table: &str, items: &[Item]) -> Result<Vec<Item>> {
        let requests = items
            .iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(item_to_attributes(item)?))
                    .build()
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| map_batch_write_error(e, table))?;

        output
            .unprocessed_items
            .unwrap_or_default()
            .remove(table)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|request| request.put_request)
            .map(|put| attributes_to_item(&put.item))
            .collect()
    }
}
