use super::{InferenceClient, InferenceEnvelope};
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// At most one retry, whatever the configuration asks for.
pub const MAX_RETRIES_CAP: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries.min(MAX_RETRIES_CAP),
            max_jitter: Duration::from_millis(config.retry_jitter_ms),
        }
    }

    fn attempts(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES_CAP) + 1
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// Bounds each call to the wrapped client and retries transient invocation
/// failures. Rejections (`retryable: false`) are returned as they are.
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: InferenceClient> InferenceClient for RetryingClient<C> {
    async fn invoke(&self, prompt: &str) -> Result<InferenceEnvelope> {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let call = self.inner.invoke(prompt);
            let outcome = match tokio::time::timeout(self.policy.timeout, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::invocation(format!(
                    "no response within {}s",
                    self.policy.timeout.as_secs_f64()
                ))),
            };

            match outcome {
                Err(Error::Invocation {
                    message,
                    retryable: true,
                }) if attempt < attempts => {
                    let delay = self.policy.jitter();
                    warn!(
                        "Inference attempt {}/{} failed, retrying in {}ms: {}",
                        attempt,
                        attempts,
                        delay.as_millis(),
                        message
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
