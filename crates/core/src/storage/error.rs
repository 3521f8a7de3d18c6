use thiserror::Error;

/// Errors reported by a document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Throughput exceeded: {0}")]
    ThroughputExceeded(String),
    #[error("Table not found: {table}")]
    TableNotFound { table: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl StoreError {
    /// Whether the store rejected the call because the request rate is above its capacity.
    pub fn is_throughput_exceeded(&self) -> bool {
        matches!(self, StoreError::ThroughputExceeded(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_throughput_exceeded_is_retryable() {
        assert!(StoreError::ThroughputExceeded("slow down".to_string()).is_throughput_exceeded());
        assert!(!StoreError::RequestFailed("boom".to_string()).is_throughput_exceeded());
        assert!(!StoreError::TableNotFound {
            table: "failures".to_string()
        }
        .is_throughput_exceeded());
    }

    #[test]
    fn test_table_not_found_display() {
        let error = StoreError::TableNotFound {
            table: "eip-delivery-failures".to_string(),
        };
        assert_eq!(error.to_string(), "Table not found: eip-delivery-failures");
    }

    #[test]
    fn test_throughput_exceeded_display() {
        let error = StoreError::ThroughputExceeded("rate above provisioned".to_string());
        assert_eq!(
            error.to_string(),
            "Throughput exceeded: rate above provisioned"
        );
    }
}
