//! Telemetry and Observability
//!
//! Completion outcomes are reported as [`GenerationEvent`]s to the exporters
//! registered on a [`TelemetryCollector`]. Export failures are logged and
//! never reach the caller.

pub mod langfuse;

pub use langfuse::LangfuseExporter;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::LlmError;
use crate::types::{Metadata, Usage};
use crate::utils::media::parse_data_url;

/// One completion, successful or not
#[derive(Debug, Clone)]
pub struct GenerationEvent {
    pub trace_name: String,
    pub model: String,
    pub provider: String,
    /// Formatted request messages, media payloads elided
    pub input: Value,
    pub output: Option<String>,
    pub usage: Option<Usage>,
    pub cost: Option<f64>,
    pub model_parameters: Metadata,
    pub metadata: Metadata,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub error: Option<String>,
}

impl GenerationEvent {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Destination for telemetry events
#[async_trait::async_trait]
pub trait TelemetryExporter: Send + Sync {
    async fn export(&self, event: &GenerationEvent) -> Result<(), LlmError>;
}

/// Upper bound on a single exporter call before it is abandoned
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fan-out to registered exporters
pub struct TelemetryCollector {
    exporters: Vec<Box<dyn TelemetryExporter>>,
    export_timeout: Duration,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self {
            exporters: Vec::new(),
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon any export that takes longer than `timeout`.
    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    pub fn export_timeout(&self) -> Duration {
        self.export_timeout
    }

    pub fn add_exporter(&mut self, exporter: Box<dyn TelemetryExporter>) {
        self.exporters.push(exporter);
    }

    pub fn clear_exporters(&mut self) {
        self.exporters.clear();
    }

    pub fn is_enabled(&self) -> bool {
        !self.exporters.is_empty()
    }

    /// Send the event to every exporter. Failures and timeouts are logged.
    pub async fn emit(&self, event: &GenerationEvent) {
        for exporter in &self.exporters {
            match tokio::time::timeout(self.export_timeout, exporter.export(event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Failed to export telemetry event: {}", e),
                Err(_) => tracing::warn!(
                    "Telemetry export timed out after {:?}",
                    self.export_timeout
                ),
            }
        }
    }
}

impl std::fmt::Debug for TelemetryCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryCollector")
            .field("exporters", &self.exporters.len())
            .field("export_timeout", &self.export_timeout)
            .finish()
    }
}

/// Replace base64 data URLs with a short placeholder.
pub fn elide_media(value: &Value) -> Value {
    match value {
        Value::String(s) => match parse_data_url(s) {
            Some((mime, data)) => Value::String(format!("<{mime}, {} base64 chars>", data.len())),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(elide_media).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), elide_media(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
