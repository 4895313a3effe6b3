use async_trait::async_trait;
use imagegen_gateway::{
    Error, Result,
    inference::{InferenceClient, InferenceEnvelope},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Mock inference client for testing
#[derive(Debug)]
pub struct MockInferenceClient {
    pub responses: Arc<Mutex<Vec<InferenceEnvelope>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub error: Option<String>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_json(self, body: Value) -> Self {
        self.add_response(InferenceEnvelope::json(body.to_string()));
        self
    }

    pub fn with_response(self, envelope: InferenceEnvelope) -> Self {
        self.add_response(envelope);
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn add_response(&self, envelope: InferenceEnvelope) {
        self.responses.lock().unwrap().push(envelope);
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn invoke(&self, prompt: &str) -> Result<InferenceEnvelope> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(ref error) = self.error {
            return Err(Error::invocation(error.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::invocation("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}
