use super::types::*;
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use aws_sdk_sagemakerruntime::{
    Client,
    config::{Region, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::Blob,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends `prompt` to the endpoint and returns the raw response.
    async fn invoke(&self, prompt: &str) -> Result<InferenceEnvelope>;
}

/// Invokes a SageMaker real-time endpoint by name.
pub struct SageMakerClient {
    client: Client,
    endpoint_name: String,
}

impl SageMakerClient {
    /// Credentials and region come from the ambient AWS environment; the
    /// configured region, if any, wins over it.
    pub async fn new(config: &InferenceConfig) -> Result<Self> {
        let mut loader = aws_config::from_env();
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        // Retries are owned by `RetryingClient`.
        let client_config = aws_sdk_sagemakerruntime::config::Builder::from(&sdk_config)
            .retry_config(RetryConfig::disabled())
            .build();

        debug!(
            "Created SageMaker client for endpoint: {}",
            config.endpoint_name
        );

        Ok(Self::from_client(
            Client::from_conf(client_config),
            config.endpoint_name.clone(),
        ))
    }

    pub fn from_client(client: Client, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }
}

#[async_trait]
impl InferenceClient for SageMakerClient {
    async fn invoke(&self, prompt: &str) -> Result<InferenceEnvelope> {
        debug!("Invoking SageMaker endpoint: {}", self.endpoint_name);

        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type(PROMPT_CONTENT_TYPE)
            .accept(RESPONSE_ACCEPT)
            .body(Blob::new(prompt.as_bytes()))
            .send()
            .await
            .map_err(|e| {
                let message = format!("{}: {}", self.endpoint_name, DisplayErrorContext(&e));
                // No raw response means the request never got an answer
                match e.raw_response().map(|raw| raw.status().as_u16()) {
                    Some(status) if !is_retryable_status(status) => Error::rejected(message),
                    _ => Error::invocation(message),
                }
            })?;

        let content_type = output.content_type().map(str::to_string);
        let body = output.body.map(Blob::into_inner).unwrap_or_default();

        debug!("SageMaker endpoint returned {} bytes", body.len());

        Ok(InferenceEnvelope::new(body, content_type))
    }
}

/// Posts the prompt to an HTTP endpoint that speaks the same contract.
pub struct HttpEndpointClient {
    url: String,
    client: reqwest::Client,
}

impl HttpEndpointClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| Error::config("HTTP inference client requires a url"))?;

        debug!("Creating HTTP inference client for: {}", url);

        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceClient for HttpEndpointClient {
    async fn invoke(&self, prompt: &str) -> Result<InferenceEnvelope> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, PROMPT_CONTENT_TYPE)
            .header(ACCEPT, RESPONSE_ACCEPT)
            .body(prompt.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| Error::invocation(format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = format!("{} returned {}: {}", self.url, status, detail);
            return Err(if is_retryable_status(status.as_u16()) {
                Error::invocation(message)
            } else {
                Error::rejected(message)
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::invocation(format!("failed to read response body: {}", e)))?;

        Ok(InferenceEnvelope::new(body.to_vec(), content_type))
    }
}
