mod client;
mod retry;
mod types;

pub use client::{HttpEndpointClient, InferenceClient, SageMakerClient};
pub use retry::{MAX_RETRIES_CAP, RetryPolicy, RetryingClient};
pub use types::*;

use crate::{
    Result,
    config::{InferenceConfig, InferenceProvider},
};
use std::sync::Arc;
use tracing::info;

/// Builds the configured client, wrapped in the timeout/retry policy.
pub async fn build_client(config: &InferenceConfig) -> Result<Arc<dyn InferenceClient>> {
    let policy = RetryPolicy::from_config(config);

    let client: Arc<dyn InferenceClient> = match config.provider {
        InferenceProvider::SageMaker => {
            info!("Using SageMaker endpoint: {}", config.endpoint_name);
            Arc::new(RetryingClient::new(SageMakerClient::new(config).await?, policy))
        }
        InferenceProvider::Http => {
            let client = HttpEndpointClient::new(config)?;
            info!("Using HTTP inference endpoint: {}", client.url());
            Arc::new(RetryingClient::new(client, policy))
        }
    };

    Ok(client)
}
