//! Wrapper configuration
//!
//! [`WrapperConfig`] carries everything a [`crate::CompletionWrapper`] needs.
//! Build it directly, through [`WrapperConfig::builder`], or from the
//! environment with [`WrapperConfig::from_env`] (which also loads `.env`).

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::LlmError;
use crate::pricing::ModelPrice;
use crate::types::ReasoningEffort;

pub const DEFAULT_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Configuration of a completion wrapper.
#[derive(Debug, Clone)]
pub struct WrapperConfig {
    /// Model name, optionally prefixed with its provider (`gemini/gemini-1.5-pro`)
    pub model_name: String,
    /// Sampling temperature; ignored for reasoning models
    pub temperature: f32,
    /// Compute, accumulate and log the cost of each completion
    pub print_cost: bool,
    /// Log formatted requests and raw responses at debug level
    pub verbose: bool,
    /// Export generations to Langfuse
    pub use_langfuse: bool,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Effort sent to reasoning models
    pub reasoning_effort: ReasoningEffort,
    /// Overrides the provider base URL
    pub api_base: Option<String>,
    /// Overrides the provider credential variable
    pub api_key: Option<SecretString>,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Prices used before the built-in table, keyed by wire model name
    pub custom_prices: HashMap<String, ModelPrice>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            print_cost: false,
            verbose: false,
            use_langfuse: true,
            max_retries: DEFAULT_MAX_RETRIES,
            reasoning_effort: ReasoningEffort::Medium,
            api_base: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            custom_prices: HashMap::new(),
        }
    }
}

impl WrapperConfig {
    pub fn new(model_name: impl Into<String>, temperature: f32) -> Self {
        Self {
            model_name: model_name.into(),
            temperature,
            ..Default::default()
        }
    }

    pub fn builder() -> WrapperConfigBuilder {
        WrapperConfigBuilder::default()
    }

    /// Load `.env`, then read `MLLM_MODEL`, `MLLM_TEMPERATURE`,
    /// `MLLM_MAX_RETRIES` and `MLLM_TIMEOUT_SECS` over the defaults.
    pub fn from_env() -> Result<Self, LlmError> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();

        let mut builder = Self::builder();
        if let Ok(model) = std::env::var("MLLM_MODEL") {
            builder = builder.model_name(model);
        }
        if let Ok(value) = std::env::var("MLLM_TEMPERATURE") {
            builder = builder.temperature(parse_env("MLLM_TEMPERATURE", &value)?);
        }
        if let Ok(value) = std::env::var("MLLM_MAX_RETRIES") {
            builder = builder.max_retries(parse_env("MLLM_MAX_RETRIES", &value)?);
        }
        if let Ok(value) = std::env::var("MLLM_TIMEOUT_SECS") {
            let secs: u64 = parse_env("MLLM_TIMEOUT_SECS", &value)?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Trace name stamped on the metadata of every call.
    pub fn trace_name(&self) -> String {
        format!("litellm-completion-{}", self.model_name)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, LlmError> {
    value.trim().parse().map_err(|_| {
        LlmError::ConfigurationError(format!("Invalid value for {name}: {value}"))
    })
}

/// Builder for [`WrapperConfig`]
#[derive(Debug, Default)]
pub struct WrapperConfigBuilder {
    model_name: Option<String>,
    temperature: Option<f32>,
    print_cost: Option<bool>,
    verbose: Option<bool>,
    use_langfuse: Option<bool>,
    max_retries: Option<u32>,
    reasoning_effort: Option<ReasoningEffort>,
    api_base: Option<String>,
    api_key: Option<SecretString>,
    timeout: Option<Duration>,
    custom_prices: HashMap<String, ModelPrice>,
}

impl WrapperConfigBuilder {
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn print_cost(mut self, print_cost: bool) -> Self {
        self.print_cost = Some(print_cost);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn use_langfuse(mut self, use_langfuse: bool) -> Self {
        self.use_langfuse = Some(use_langfuse);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register a price for a wire model name.
    pub fn custom_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.custom_prices.insert(model.into(), price);
        self
    }

    pub fn build(self) -> Result<WrapperConfig, LlmError> {
        let defaults = WrapperConfig::default();
        let model_name = self.model_name.unwrap_or(defaults.model_name);
        if model_name.trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "Model name cannot be empty".to_string(),
            ));
        }

        let temperature = self.temperature.unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(LlmError::ConfigurationError(format!(
                "Temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }

        Ok(WrapperConfig {
            model_name,
            temperature,
            print_cost: self.print_cost.unwrap_or(defaults.print_cost),
            verbose: self.verbose.unwrap_or(defaults.verbose),
            use_langfuse: self.use_langfuse.unwrap_or(defaults.use_langfuse),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            reasoning_effort: self.reasoning_effort.unwrap_or(defaults.reasoning_effort),
            api_base: self.api_base,
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            custom_prices: self.custom_prices,
        })
    }
}
