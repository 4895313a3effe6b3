use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// `retryable` is false when the endpoint rejected the request outright.
    #[error("Endpoint invocation failed: {message}")]
    Invocation { message: String, retryable: bool },

    #[error("Response parse error: {0}")]
    ResponseParse(String),

    #[error("Invalid pixel data: {0}")]
    InvalidPixels(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation {
            message: msg.into(),
            retryable: true,
        }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Invocation {
            message: msg.into(),
            retryable: false,
        }
    }

    pub fn response_parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }

    pub fn invalid_pixels(msg: impl Into<String>) -> Self {
        Self::InvalidPixels(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable identifier reported to HTTP callers alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invocation { .. } => "endpoint_invocation_failed",
            Self::ResponseParse(_) => "response_parse_error",
            Self::InvalidPixels(_) => "invalid_pixel_data",
            Self::Persistence(_) => "persistence_error",
            Self::Encoding(_) => "encoding_error",
            Self::Config(_) | Self::Yaml(_) | Self::AddrParse(_) => "configuration_error",
            Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invocation { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
