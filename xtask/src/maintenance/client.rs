//! AWS SDK client setup (Imperative Shell).

use super::error::{MaintenanceCliError, Result};
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::TimeToLiveStatus;
use aws_sdk_dynamodb::Client;

/// AWS client configuration.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

/// Returns whether the table exists.
pub async fn table_exists(client: &Client, table_name: &str) -> Result<bool> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => Ok(true),
        Err(err) => match err.into_service_error() {
            DescribeTableError::ResourceNotFoundException(_) => Ok(false),
            err => Err(MaintenanceCliError::AwsSdk(err.to_string())),
        },
    }
}

/// Returns the attribute the table's TTL sweeper reads, if TTL is enabled.
pub async fn ttl_attribute(client: &Client, table_name: &str) -> Result<Option<String>> {
    let output = client
        .describe_time_to_live()
        .table_name(table_name)
        .send()
        .await
        .map_err(|e| MaintenanceCliError::AwsSdk(e.to_string()))?;

    Ok(output.time_to_live_description().and_then(|description| {
        match description.time_to_live_status() {
            Some(TimeToLiveStatus::Enabled) => description.attribute_name().map(str::to_string),
            _ => None,
        }
    }))
}
