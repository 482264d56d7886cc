//! Core data types
//!
//! A [`Message`] is the provider-neutral input unit: a kind (text, image,
//! audio, video) plus its content. Requests and responses mirror the
//! OpenAI-compatible chat completion wire format.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// Free-form metadata attached to each completion for tracing.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Kind of a generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
}

impl MessageKind {
    /// Image, audio and video messages carry media content.
    pub const fn is_media(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Encoded image bytes held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryImage {
    /// Encoded image data (PNG, JPEG, ...)
    pub data: Vec<u8>,
}

impl InMemoryImage {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Image MIME type sniffed from the bytes, `image/png` when unknown.
    pub fn mime_type(&self) -> String {
        crate::utils::mime::guess_mime_from_bytes(&self.data)
            .filter(|m| m.starts_with("image/"))
            .unwrap_or_else(|| "image/png".to_string())
    }
}

/// Content of a generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Local file to be base64-encoded
    Path(PathBuf),
    /// In-memory image to be base64-encoded
    Image(InMemoryImage),
    /// URL or base64 data, sent as is
    Url(String),
    /// File path, URL or base64 data; an existing file is encoded, anything
    /// else is sent as is. Checked when the request is built.
    Source(String),
}

impl MessageContent {
    /// Resolve a [`MessageContent::Source`] against the filesystem now.
    pub fn classify(&self) -> Self {
        match self {
            Self::Source(value) if Path::new(value).is_file() => Self::Path(PathBuf::from(value)),
            Self::Source(value) => Self::Url(value.clone()),
            other => other.clone(),
        }
    }

    /// Human-readable description for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Path(path) => path.display().to_string(),
            Self::Image(image) => format!("<in-memory image, {} bytes>", image.data.len()),
            Self::Url(url) | Self::Source(url) => url.clone(),
        }
    }
}

/// A single provider-neutral message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub content: MessageContent,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Image from a file path, URL or base64 string.
    pub fn image(source: impl AsRef<str>) -> Self {
        Self::media(MessageKind::Image, source)
    }

    /// Audio from a file path, URL or base64 string.
    pub fn audio(source: impl AsRef<str>) -> Self {
        Self::media(MessageKind::Audio, source)
    }

    /// Video from a file path, URL or base64 string.
    pub fn video(source: impl AsRef<str>) -> Self {
        Self::media(MessageKind::Video, source)
    }

    /// Image from encoded bytes held in memory.
    pub fn image_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: MessageKind::Image,
            content: MessageContent::Image(InMemoryImage::new(data)),
        }
    }

    /// Media message with explicit content.
    pub fn with_content(kind: MessageKind, content: MessageContent) -> Self {
        Self { kind, content }
    }

    fn media(kind: MessageKind, source: impl AsRef<str>) -> Self {
        Self {
            kind,
            content: MessageContent::Source(source.as_ref().to_string()),
        }
    }
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    content: String,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMessage::deserialize(deserializer)?;
        Ok(match raw.kind {
            MessageKind::Text => Message::text(raw.content),
            kind => Message::media(kind, raw.content),
        })
    }
}

/// Reasoning effort level for reasoning models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Provider-ready completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model name as sent on the wire (provider prefix stripped)
    pub model: String,
    pub messages: Vec<serde_json::Value>,
    /// Caller metadata; used for tracing and telemetry, never sent
    #[serde(skip)]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Retry budget; consumed locally, never sent
    #[serde(skip)]
    pub max_retries: u32,
}

/// Parsed completion response.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text of the first choice, `None` when the provider returned null
    pub content: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    /// Raw response body
    pub raw: serde_json::Value,
}
