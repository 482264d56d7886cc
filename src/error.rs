//! Error Handling Module
//!
//! Every failure inside the completion pipeline is an [`LlmError`]. The public
//! `call` entry point folds these into their display string; `try_call` hands
//! them back typed.
//!
//! # Example
//!
//! ```rust
//! use mllm_tools::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Errors produced while formatting, sending or accounting a completion.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// Transport level failure (connection refused, TLS, DNS...)
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Local file could not be read
    #[error("IO error: {0}")]
    IoError(String),

    /// Non-success response from the provider
    #[error("API error: {code} - {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Missing credentials, unknown provider settings and the like
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Input the wrapper cannot turn into a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// MIME type could not be determined for a local file
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Provider response did not have the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request exceeded the configured timeout
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// No price is known for the model
    #[error("Pricing error: {0}")]
    PricingError(String),
}

/// Coarse error classification used for retry decisions and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    RateLimit,
    Client,
    Server,
    Parsing,
    Configuration,
    Input,
}

impl LlmError {
    /// Build an API error without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// HTTP status code, when the error came from the provider.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::TimeoutError(_) => ErrorCategory::Network,
            Self::ApiError { code, .. } => match *code {
                401 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::JsonError(_) | Self::ParseError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) | Self::PricingError(_) => ErrorCategory::Configuration,
            Self::IoError(_) | Self::InvalidInput(_) | Self::UnsupportedFileType(_) => {
                ErrorCategory::Input
            }
        }
    }

    /// Whether sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit | ErrorCategory::Server
        ) || self.status_code() == Some(408)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else if err.is_builder() {
            // Malformed URL or header; retrying cannot help
            Self::ConfigurationError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
