//! Completion transport
//!
//! [`CompletionBackend`] is the seam between the wrapper and the network.
//! [`HttpCompletionBackend`] speaks the OpenAI-compatible
//! `/chat/completions` protocol over reqwest and retries through
//! [`BackoffRetryExecutor`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::WrapperConfig;
use crate::error::LlmError;
use crate::provider::ProviderFamily;
use crate::retry::BackoffRetryExecutor;
use crate::transformers::{extract_error_message, transform_chat_response};
use crate::types::{CompletionRequest, CompletionResponse};

const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

/// Sends a completion request and returns the parsed response
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// reqwest-based backend for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct HttpCompletionBackend {
    client: reqwest::Client,
    family: ProviderFamily,
    base_url: String,
    api_key: SecretString,
    retry: Option<BackoffRetryExecutor>,
}

impl HttpCompletionBackend {
    pub fn new(
        family: ProviderFamily,
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            family,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            retry: None,
        })
    }

    /// Resolve family, endpoint and credentials from a wrapper config.
    pub fn from_config(config: &WrapperConfig) -> Result<Self, LlmError> {
        Self::from_config_for(ProviderFamily::from_model(&config.model_name), config)
    }

    /// Like [`Self::from_config`] with the provider family fixed.
    pub fn from_config_for(family: ProviderFamily, config: &WrapperConfig) -> Result<Self, LlmError> {
        let base_url = match &config.api_base {
            Some(base) => base.clone(),
            None => family.resolve_base_url()?,
        };
        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => std::env::var(family.api_key_env())
                .map(SecretString::from)
                .map_err(|_| {
                    LlmError::ConfigurationError(format!(
                        "Missing API key: set {} for {} models",
                        family.api_key_env(),
                        family.id()
                    ))
                })?,
        };

        Self::new(family, base_url, api_key, config.timeout)
    }

    /// Retry executor used for every request; without one, requests use
    /// their own `max_retries` with the default backoff.
    pub fn with_retry(mut self, retry: BackoffRetryExecutor) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        match self.family {
            ProviderFamily::Azure => {
                let version = std::env::var("AZURE_API_VERSION")
                    .unwrap_or_else(|_| DEFAULT_AZURE_API_VERSION.to_string());
                format!(
                    "{}/openai/deployments/{}/chat/completions?api-version={}",
                    self.base_url, model, version
                )
            }
            _ => format!("{}/chat/completions", self.base_url),
        }
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = self.endpoint(&request.model);
        let builder = self.client.post(&url).json(request);
        let builder = match self.family {
            ProviderFamily::Azure => builder.header("api-key", self.api_key.expose_secret()),
            _ => builder.bearer_auth(self.api_key.expose_secret()),
        };

        tracing::debug!(provider = self.family.id(), url = %url, "Sending completion request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let details = serde_json::from_str::<serde_json::Value>(&body).ok();
            let message = details
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| body.clone());
            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message,
                details,
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&body)?;
        transform_chat_response(raw)
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let retry = self
            .retry
            .clone()
            .unwrap_or_else(|| BackoffRetryExecutor::new(request.max_retries));
        retry.execute(move || self.send_once(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(family: ProviderFamily, base: &str) -> HttpCompletionBackend {
        HttpCompletionBackend::new(
            family,
            base,
            SecretString::from("test-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        let openai = backend(ProviderFamily::OpenAi, "https://api.openai.com/v1/");
        assert_eq!(
            openai.endpoint("gpt-4o"),
            "https://api.openai.com/v1/chat/completions"
        );

        if std::env::var("AZURE_API_VERSION").is_err() {
            let azure = backend(ProviderFamily::Azure, "https://example.openai.azure.com");
            assert_eq!(
                azure.endpoint("gpt-4o"),
                "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
            );
        }
    }

    #[test]
    fn test_from_config_with_explicit_credentials() {
        let config = WrapperConfig::builder()
            .model_name("deepseek/deepseek-chat")
            .api_base("http://localhost:9999/v1")
            .api_key("sk-local")
            .build()
            .unwrap();
        let backend = HttpCompletionBackend::from_config(&config).unwrap();
        assert_eq!(backend.family(), ProviderFamily::DeepSeek);
        assert_eq!(backend.base_url(), "http://localhost:9999/v1");
    }

    #[tokio::test]
    async fn test_malformed_base_url_is_not_retried() {
        let backend = backend(ProviderFamily::OpenAi, "no-scheme/v1");
        let request = CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![],
            metadata: Default::default(),
            temperature: Some(0.7),
            reasoning_effort: None,
            max_retries: 3,
        };

        // A retried error would sleep through the backoff before returning
        let err = tokio::time::timeout(Duration::from_millis(400), backend.complete(&request))
            .await
            .expect("builder errors fail fast")
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }
}
