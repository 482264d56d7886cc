//! DeepSeek wrapper
//!
//! Text-only wrapper bound to the DeepSeek API. Any `provider/` prefix on the
//! model name is dropped, so `deepseek/deepseek-chat` and `deepseek-chat`
//! behave the same. Media messages are discarded with a warning.

use std::sync::Arc;

use crate::config::WrapperConfig;
use crate::error::LlmError;
use crate::executor::CompletionBackend;
use crate::provider::ProviderFamily;
use crate::transformers::TextOnlyRequestTransformer;
use crate::types::{Message, Metadata};
use crate::wrapper::CompletionWrapper;

/// DeepSeek model constants
pub mod models {
    pub const CHAT: &str = "deepseek-chat";
    pub const REASONER: &str = "deepseek-reasoner";
}

pub use models::*;

/// Completion wrapper for DeepSeek chat models
#[derive(Debug)]
pub struct DeepSeekWrapper {
    inner: CompletionWrapper,
}

impl DeepSeekWrapper {
    pub fn new(
        model_name: &str,
        temperature: f32,
        print_cost: bool,
        verbose: bool,
        use_langfuse: bool,
    ) -> Self {
        let config = WrapperConfig {
            print_cost,
            verbose,
            use_langfuse,
            ..WrapperConfig::new(Self::bare_model_name(model_name), temperature)
        };
        Self::from_config(config)
    }

    /// Build from a full config; the model name is stripped the same way.
    pub fn from_config(mut config: WrapperConfig) -> Self {
        config.model_name = Self::bare_model_name(&config.model_name).to_string();
        let inner = CompletionWrapper::new(config)
            .with_family(ProviderFamily::DeepSeek)
            .with_transformer(Box::new(TextOnlyRequestTransformer));
        Self { inner }
    }

    /// Like [`Self::from_config`], sending through the given backend.
    pub fn with_backend(mut config: WrapperConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        config.model_name = Self::bare_model_name(&config.model_name).to_string();
        let inner = CompletionWrapper::with_backend(config, backend)
            .with_family(ProviderFamily::DeepSeek)
            .with_transformer(Box::new(TextOnlyRequestTransformer));
        Self { inner }
    }

    /// Last path segment of a model name.
    pub fn bare_model_name(model_name: &str) -> &str {
        model_name.rsplit('/').next().unwrap_or(model_name)
    }

    pub fn model_name(&self) -> &str {
        &self.inner.config().model_name
    }

    pub fn accumulated_cost(&self) -> f64 {
        self.inner.accumulated_cost()
    }

    /// See [`CompletionWrapper::call`].
    pub async fn call(&mut self, messages: &[Message], metadata: Option<Metadata>) -> String {
        self.inner.call(messages, metadata).await
    }

    /// See [`CompletionWrapper::try_call`].
    pub async fn try_call(
        &mut self,
        messages: &[Message],
        metadata: Option<Metadata>,
    ) -> Result<String, LlmError> {
        self.inner.try_call(messages, metadata).await
    }
}
