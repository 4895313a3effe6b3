/// Content type the prompt is sent with.
pub const PROMPT_CONTENT_TYPE: &str = "application/x-text";
/// Content type requested for the response.
pub const RESPONSE_ACCEPT: &str = "application/json";

/// Statuses worth another attempt: timeouts, throttling and server faults.
pub fn is_retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}

/// Unparsed response from the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceEnvelope {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl InferenceEnvelope {
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self { body, content_type }
    }

    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(body.into(), Some(RESPONSE_ACCEPT.to_string()))
    }

    /// True when the endpoint answered with encoded image bytes instead of JSON.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("image/"))
    }
}
