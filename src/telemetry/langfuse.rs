//! Langfuse Exporter
//!
//! Sends each generation to the Langfuse ingestion API as a trace plus a
//! generation observation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::{GenerationEvent, TelemetryExporter};
use crate::error::LlmError;
use crate::types::Metadata;

pub const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";

/// Per-request timeout for ingestion calls
pub const DEFAULT_INGESTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Langfuse exporter
pub struct LangfuseExporter {
    client: Client,
    endpoint: String,
    public_key: String,
    secret_key: SecretString,
    timeout: Duration,
}

impl LangfuseExporter {
    pub fn new(
        endpoint: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            public_key: public_key.into(),
            secret_key: SecretString::from(secret_key.into()),
            timeout: DEFAULT_INGESTION_TIMEOUT,
        }
    }

    /// Override the per-request ingestion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from `LANGFUSE_PUBLIC_KEY`, `LANGFUSE_SECRET_KEY` and the
    /// optional `LANGFUSE_HOST`. `None` when either key is missing.
    pub fn from_env() -> Option<Self> {
        let public_key = std::env::var("LANGFUSE_PUBLIC_KEY").ok()?;
        let secret_key = std::env::var("LANGFUSE_SECRET_KEY").ok()?;
        let host =
            std::env::var("LANGFUSE_HOST").unwrap_or_else(|_| DEFAULT_LANGFUSE_HOST.to_string());
        Some(Self::new(host, public_key, secret_key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn batch(&self, generation: &GenerationEvent) -> IngestionBatch {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let timestamp = generation.end_time;

        let trace = IngestionEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            kind: "trace-create",
            body: serde_json::to_value(LangfuseTrace {
                id: trace_id.clone(),
                name: generation.trace_name.clone(),
                timestamp: generation.start_time,
                input: generation.input.clone(),
                output: generation.output.clone(),
                metadata: generation.metadata.clone(),
            })
            .unwrap_or(Value::Null),
        };

        let observation = IngestionEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            kind: "generation-create",
            body: serde_json::to_value(LangfuseGeneration {
                id: uuid::Uuid::new_v4().to_string(),
                trace_id,
                name: format!("{}/{}", generation.provider, generation.model),
                start_time: generation.start_time,
                end_time: generation.end_time,
                model: generation.model.clone(),
                model_parameters: generation.model_parameters.clone(),
                input: generation.input.clone(),
                output: generation.output.clone(),
                usage: generation.usage.as_ref().map(|u| LangfuseUsage {
                    input: u.prompt_tokens,
                    output: u.completion_tokens,
                    total: u.total_tokens,
                    unit: "TOKENS",
                    total_cost: generation.cost,
                }),
                metadata: generation.metadata.clone(),
                level: if generation.is_error() { "ERROR" } else { "DEFAULT" },
                status_message: generation.error.clone(),
            })
            .unwrap_or(Value::Null),
        };

        IngestionBatch {
            batch: vec![trace, observation],
        }
    }
}

#[async_trait::async_trait]
impl TelemetryExporter for LangfuseExporter {
    async fn export(&self, event: &GenerationEvent) -> Result<(), LlmError> {
        let url = format!("{}/api/public/ingestion", self.endpoint);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.public_key, Some(self.secret_key.expose_secret()))
            .timeout(self.timeout)
            .json(&self.batch(event))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message: format!("Langfuse API error: {body}"),
                details: None,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct IngestionBatch {
    batch: Vec<IngestionEvent>,
}

#[derive(Debug, Serialize)]
struct IngestionEvent {
    id: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: &'static str,
    body: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LangfuseTrace {
    id: String,
    name: String,
    timestamp: DateTime<Utc>,
    input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    metadata: Metadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LangfuseGeneration {
    id: String,
    trace_id: String,
    name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    model: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    model_parameters: Metadata,
    input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<LangfuseUsage>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    metadata: Metadata,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LangfuseUsage {
    input: u64,
    output: u64,
    total: u64,
    unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_cost: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Usage;
    use serde_json::json;

    #[test]
    fn test_langfuse_exporter_creation() {
        let exporter = LangfuseExporter::new("https://cloud.langfuse.com/", "pk-test", "sk-test");
        assert_eq!(exporter.endpoint(), "https://cloud.langfuse.com");
        assert_eq!(exporter.public_key, "pk-test");
        assert_eq!(exporter.secret_key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_failed_generation_batch() {
        let exporter = LangfuseExporter::new("http://localhost", "pk", "sk");
        let now = Utc::now();
        let event = GenerationEvent {
            trace_name: "litellm-completion-gpt-4o".into(),
            model: "gpt-4o".into(),
            provider: "openai".into(),
            input: json!([{"role": "user"}]),
            output: None,
            usage: Some(Usage {
                prompt_tokens: 3,
                completion_tokens: 0,
                total_tokens: 3,
            }),
            cost: None,
            model_parameters: Metadata::new(),
            metadata: Metadata::new(),
            start_time: now,
            end_time: now,
            error: Some("API error: 500 - boom".into()),
        };

        let batch = serde_json::to_value(exporter.batch(&event)).unwrap();
        assert_eq!(batch["batch"][0]["type"], "trace-create");
        assert_eq!(batch["batch"][0]["body"]["name"], "litellm-completion-gpt-4o");

        let generation = &batch["batch"][1];
        assert_eq!(generation["type"], "generation-create");
        assert_eq!(generation["body"]["level"], "ERROR");
        assert_eq!(generation["body"]["statusMessage"], "API error: 500 - boom");
        assert_eq!(generation["body"]["usage"]["input"], 3);
        assert_eq!(
            generation["body"]["traceId"],
            batch["batch"][0]["body"]["id"]
        );
    }
}
