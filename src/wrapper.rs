//! Completion wrapper
//!
//! [`CompletionWrapper`] is the single entry point: it formats a list of
//! provider-neutral messages for the configured model, sends them, tracks
//! cost and reports the outcome to telemetry.
//!
//! ```rust,no_run
//! use mllm_tools::{CompletionWrapper, Message, WrapperConfig};
//!
//! # async fn example() {
//! let config = WrapperConfig::builder()
//!     .model_name("gemini/gemini-1.5-pro-002")
//!     .temperature(0.7)
//!     .print_cost(true)
//!     .build()
//!     .unwrap();
//! let mut llm = CompletionWrapper::new(config);
//!
//! let text = llm
//!     .call(
//!         &[Message::text("Describe this frame"), Message::image("frame.png")],
//!         None,
//!     )
//!     .await;
//! println!("{text}");
//! # }
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::config::WrapperConfig;
use crate::error::LlmError;
use crate::executor::{CompletionBackend, HttpCompletionBackend};
use crate::pricing::completion_cost;
use crate::provider::ProviderFamily;
use crate::telemetry::{GenerationEvent, LangfuseExporter, TelemetryCollector, elide_media};
use crate::transformers::{RequestTransformer, build_request, transformer_for_model};
use crate::types::{CompletionRequest, CompletionResponse, Message, Metadata};

/// Uniform completion interface over multiple providers
pub struct CompletionWrapper {
    config: WrapperConfig,
    family: ProviderFamily,
    transformer: Box<dyn RequestTransformer>,
    backend: Option<Arc<dyn CompletionBackend>>,
    telemetry: TelemetryCollector,
    accumulated_cost: f64,
}

impl CompletionWrapper {
    /// Create a wrapper; the HTTP backend is resolved on first call.
    pub fn new(config: WrapperConfig) -> Self {
        let mut telemetry = TelemetryCollector::new();
        if config.use_langfuse {
            match LangfuseExporter::from_env() {
                Some(exporter) => telemetry.add_exporter(Box::new(exporter)),
                None => tracing::warn!(
                    "Langfuse enabled but LANGFUSE_PUBLIC_KEY/LANGFUSE_SECRET_KEY are not set"
                ),
            }
        }

        Self {
            family: ProviderFamily::from_model(&config.model_name),
            transformer: transformer_for_model(&config.model_name),
            backend: None,
            telemetry,
            accumulated_cost: 0.0,
            config,
        }
    }

    /// Create a wrapper that sends through the given backend.
    pub fn with_backend(config: WrapperConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        let mut wrapper = Self::new(config);
        wrapper.backend = Some(backend);
        wrapper
    }

    /// Replace the message transformer.
    pub fn with_transformer(mut self, transformer: Box<dyn RequestTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    /// Route to a fixed provider family regardless of the model name.
    pub fn with_family(mut self, family: ProviderFamily) -> Self {
        self.family = family;
        self
    }

    /// Replace the telemetry collector.
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    /// Total cost of all completions so far, in USD.
    pub fn accumulated_cost(&self) -> f64 {
        self.accumulated_cost
    }

    pub fn reset_cost(&mut self) {
        self.accumulated_cost = 0.0;
    }

    /// Run a completion and return its text.
    ///
    /// Failures are logged and returned as their display string; a null
    /// completion yields an empty string.
    pub async fn call(&mut self, messages: &[Message], metadata: Option<Metadata>) -> String {
        match self.try_call(messages, metadata).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error in model completion: {}", e);
                e.to_string()
            }
        }
    }

    /// Run a completion, returning errors typed.
    pub async fn try_call(
        &mut self,
        messages: &[Message],
        metadata: Option<Metadata>,
    ) -> Result<String, LlmError> {
        let start_time = Utc::now();

        let mut metadata = metadata.unwrap_or_else(|| {
            if self.config.verbose {
                tracing::debug!("No metadata provided, using empty metadata");
            }
            Metadata::new()
        });
        metadata.insert(
            "trace_name".to_string(),
            Value::String(self.config.trace_name()),
        );

        let formatted = self.transformer.format_messages(messages);
        let request = build_request(&self.config, formatted, metadata);
        if self.config.verbose {
            let request_json =
                serde_json::to_string(&elide_media(&Value::Array(request.messages.clone())))
                    .unwrap_or_default();
            tracing::debug!(
                model = %request.model,
                provider = self.family.id(),
                "Completion request: {}",
                request_json
            );
        }

        let result = match self.resolve_backend() {
            Ok(backend) => backend.complete(&request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                if self.config.verbose {
                    tracing::debug!("Completion response: {}", response.raw);
                }
                let cost = self.account_cost(&request, &response);
                self.report(&request, start_time, Ok(&response), cost).await;

                match response.content {
                    Some(content) => Ok(content),
                    None => {
                        tracing::warn!(
                            "Got null response from model. Full response: {}",
                            response.raw
                        );
                        Ok(String::new())
                    }
                }
            }
            Err(e) => {
                self.report(&request, start_time, Err(&e), None).await;
                Err(e)
            }
        }
    }

    fn resolve_backend(&mut self) -> Result<Arc<dyn CompletionBackend>, LlmError> {
        if let Some(backend) = &self.backend {
            return Ok(backend.clone());
        }
        let backend: Arc<dyn CompletionBackend> =
            Arc::new(HttpCompletionBackend::from_config_for(self.family, &self.config)?);
        self.backend = Some(backend.clone());
        Ok(backend)
    }

    /// Add the cost of a response to the running total when enabled.
    fn account_cost(
        &mut self,
        request: &CompletionRequest,
        response: &CompletionResponse,
    ) -> Option<f64> {
        if !self.config.print_cost {
            return None;
        }
        let Some(usage) = response.usage.as_ref() else {
            tracing::warn!("No usage reported by {}, cost not computed", request.model);
            return None;
        };

        match completion_cost(&request.model, usage, &self.config.custom_prices) {
            Ok(cost) => {
                self.accumulated_cost += cost;
                tracing::info!("Accumulated Cost: ${:.6}", self.accumulated_cost);
                Some(cost)
            }
            Err(e) => {
                tracing::warn!("Could not compute completion cost: {}", e);
                None
            }
        }
    }

    async fn report(
        &self,
        request: &CompletionRequest,
        start_time: chrono::DateTime<Utc>,
        outcome: Result<&CompletionResponse, &LlmError>,
        cost: Option<f64>,
    ) {
        if !self.telemetry.is_enabled() {
            return;
        }

        let mut model_parameters = Metadata::new();
        if let Some(temperature) = request.temperature {
            model_parameters.insert("temperature".to_string(), Value::from(temperature));
        }
        if let Some(effort) = request.reasoning_effort {
            model_parameters.insert(
                "reasoning_effort".to_string(),
                serde_json::to_value(effort).unwrap_or(Value::Null),
            );
        }

        let (output, usage, error) = match outcome {
            Ok(response) => (response.content.clone(), response.usage, None),
            Err(e) => (None, None, Some(e.to_string())),
        };

        let event = GenerationEvent {
            trace_name: self.config.trace_name(),
            model: request.model.clone(),
            provider: self.family.id().to_string(),
            input: elide_media(&Value::Array(request.messages.clone())),
            output,
            usage,
            cost,
            model_parameters,
            metadata: request.metadata.clone(),
            start_time,
            end_time: Utc::now(),
            error,
        };
        self.telemetry.emit(&event).await;
    }
}

impl std::fmt::Debug for CompletionWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionWrapper")
            .field("model_name", &self.config.model_name)
            .field("family", &self.family)
            .field("transformer", &self.transformer.provider_id())
            .field("accumulated_cost", &self.accumulated_cost)
            .finish()
    }
}
