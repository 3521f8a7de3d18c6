//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `eip_core::storage`. Throughput
//! and request-rate rejections both become `ThroughputExceeded` so the
//! maintenance backoff handles them.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use eip_core::storage::StoreError;

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table: &str,
) -> StoreError {
    if let Some(connection) = connection_error(&err) {
        return connection;
    }
    match err.into_service_error() {
        ScanError::ProvisionedThroughputExceededException(e) => {
            StoreError::ThroughputExceeded(e.message().unwrap_or("Scan throttled").to_string())
        }
        ScanError::RequestLimitExceeded(e) => {
            StoreError::ThroughputExceeded(
                e.message().unwrap_or("Request limit exceeded").to_string(),
            )
        }
        ScanError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table: table.to_string(),
        },
        ScanError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("Scan failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to StoreError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(connection) = connection_error(&err) {
        return connection;
    }
    match err.into_service_error() {
        BatchWriteItemError::ProvisionedThroughputExceededException(e) => {
            StoreError::ThroughputExceeded(
                e.message().unwrap_or("Batch write throttled").to_string(),
            )
        }
        BatchWriteItemError::RequestLimitExceeded(e) => {
            StoreError::ThroughputExceeded(
                e.message().unwrap_or("Request limit exceeded").to_string(),
            )
        }
        BatchWriteItemError::ResourceNotFoundException(_) => StoreError::TableNotFound {
            table: table.to_string(),
        },
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        BatchWriteItemError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("BatchWriteItem failed: {:?}", err)),
    }
}

fn connection_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError> {
    let reason = match err {
        SdkError::DispatchFailure(_) => "request could not be dispatched",
        SdkError::TimeoutError(_) => "request timed out",
        _ => return None,
    };
    Some(StoreError::ConnectionFailed(reason.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ProvisionedThroughputExceededException, RequestLimitExceeded, ResourceNotFoundException,
    };

    #[test]
    fn test_scan_throughput_exceeded() {
        let err = SdkError::service_error(
            ScanError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("Rate of requests exceeds the allowed throughput")
                    .build(),
            ),
            (),
        );

        assert_eq!(
            map_scan_error(err, "failures"),
            StoreError::ThroughputExceeded(
                "Rate of requests exceeds the allowed throughput".to_string()
            )
        );
    }

    #[test]
    fn test_batch_write_request_limit_is_throttling() {
        let err = SdkError::service_error(
            BatchWriteItemError::RequestLimitExceeded(RequestLimitExceeded::builder().build()),
            (),
        );

        assert!(map_batch_write_error(err, "failures").is_throughput_exceeded());
    }

    #[test]
    fn test_missing_table() {
        let err = SdkError::service_error(
            BatchWriteItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder().build(),
            ),
            (),
        );

        assert_eq!(
            map_batch_write_error(err, "failures"),
            StoreError::TableNotFound {
                table: "failures".to_string()
            }
        );
    }
}
