//! Request transformation
//!
//! Turns provider-neutral [`Message`]s into OpenAI-compatible chat messages.
//! Every message becomes its own `user` turn with a single content part; the
//! only per-provider difference is the shape of media parts.

use serde_json::{Value, json};

use crate::config::WrapperConfig;
use crate::error::LlmError;
use crate::provider::{is_gemini_model, is_reasoning_model, wire_model_name};
use crate::types::{CompletionRequest, Message, MessageContent, MessageKind, Metadata};
use crate::utils::media::resolve_media_url;

/// Transform provider-neutral messages into a provider-specific payload
pub trait RequestTransformer: Send + Sync {
    /// Provider identifier used in logs
    fn provider_id(&self) -> &str;

    /// Content part carrying a resolved media URL
    fn media_part(&self, url: String) -> Value;

    /// Content part carrying text
    fn text_part(&self, text: &str) -> Value {
        json!({"type": "text", "text": text})
    }

    /// Format one message. `Ok(None)` drops the message.
    fn format_message(&self, message: &Message) -> Result<Option<Value>, LlmError> {
        let part = match (message.kind, &message.content) {
            (MessageKind::Text, MessageContent::Text(text)) => self.text_part(text),
            (MessageKind::Text, other) => {
                return Err(LlmError::InvalidInput(format!(
                    "text message with non-text content: {}",
                    other.describe()
                )));
            }
            (_, content) => self.media_part(resolve_media_url(content)?),
        };
        Ok(Some(json!({"role": "user", "content": [part]})))
    }

    /// Format all messages in order. Messages that fail to format are logged
    /// and skipped.
    fn format_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .filter_map(|message| match self.format_message(message) {
                Ok(formatted) => formatted,
                Err(e) => {
                    tracing::error!(
                        provider = self.provider_id(),
                        "Error processing file {}: {}",
                        message.content.describe(),
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

/// Gemini takes the data URL directly as the `image_url` value
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiRequestTransformer;

impl RequestTransformer for GeminiRequestTransformer {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn media_part(&self, url: String) -> Value {
        json!({"type": "image_url", "image_url": url})
    }
}

/// Shape understood by GPT, Claude, DeepSeek and other OpenAI-compatible APIs
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalRequestTransformer;

impl RequestTransformer for UniversalRequestTransformer {
    fn provider_id(&self) -> &str {
        "openai-compatible"
    }

    fn media_part(&self, url: String) -> Value {
        json!({
            "type": "image_url",
            "image_url": {
                "url": url,
                "detail": "high"
            }
        })
    }
}

/// Drops media messages; for text-only endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOnlyRequestTransformer;

impl RequestTransformer for TextOnlyRequestTransformer {
    fn provider_id(&self) -> &str {
        "text-only"
    }

    fn media_part(&self, url: String) -> Value {
        UniversalRequestTransformer.media_part(url)
    }

    fn format_message(&self, message: &Message) -> Result<Option<Value>, LlmError> {
        if message.kind.is_media() {
            tracing::warn!(
                "Dropping {:?} message, model accepts text only: {}",
                message.kind,
                message.content.describe()
            );
            return Ok(None);
        }
        UniversalRequestTransformer.format_message(message)
    }
}

/// Pick the media shape for a model name.
pub fn transformer_for_model(model: &str) -> Box<dyn RequestTransformer> {
    if is_gemini_model(model) {
        Box::new(GeminiRequestTransformer)
    } else {
        Box::new(UniversalRequestTransformer)
    }
}

/// Assemble the completion request for already formatted messages.
///
/// Reasoning models get `reasoning_effort` and no temperature.
pub fn build_request(
    config: &WrapperConfig,
    messages: Vec<Value>,
    metadata: Metadata,
) -> CompletionRequest {
    let reasoning = is_reasoning_model(&config.model_name);
    CompletionRequest {
        model: wire_model_name(&config.model_name).to_string(),
        messages,
        metadata,
        temperature: (!reasoning).then_some(config.temperature),
        reasoning_effort: reasoning.then_some(config.reasoning_effort),
        max_retries: config.max_retries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReasoningEffort;

    #[test]
    fn test_text_message_is_single_user_entry() {
        let formatted = UniversalRequestTransformer.format_messages(&[Message::text("hello")]);
        assert_eq!(
            formatted,
            vec![json!({"role": "user", "content": [{"type": "text", "text": "hello"}]})]
        );
    }

    #[test]
    fn test_media_shapes() {
        let msg = Message::image("https://example.com/cat.png");

        let gemini = GeminiRequestTransformer.format_messages(std::slice::from_ref(&msg));
        assert_eq!(
            gemini[0]["content"][0],
            json!({"type": "image_url", "image_url": "https://example.com/cat.png"})
        );

        let universal = UniversalRequestTransformer.format_messages(&[msg]);
        assert_eq!(
            universal[0]["content"][0],
            json!({
                "type": "image_url",
                "image_url": {"url": "https://example.com/cat.png", "detail": "high"}
            })
        );
    }

    #[test]
    fn test_unsupported_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.unknownext");
        std::fs::write(&file, b"???").unwrap();

        let messages = vec![
            Message::text("before"),
            Message::video(file.to_str().unwrap()),
            Message::text("after"),
        ];
        let formatted = UniversalRequestTransformer.format_messages(&messages);
        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0]["content"][0]["text"], "before");
        assert_eq!(formatted[1]["content"][0]["text"], "after");
    }

    #[test]
    fn test_text_only_drops_media() {
        let messages = vec![
            Message::text("describe"),
            Message::image_bytes(vec![1, 2, 3]),
        ];
        let formatted = TextOnlyRequestTransformer.format_messages(&messages);
        assert_eq!(formatted.len(), 1);
    }

    #[test]
    fn test_transformer_for_model() {
        assert_eq!(
            transformer_for_model("gemini/gemini-1.5-pro").provider_id(),
            "gemini"
        );
        assert_eq!(
            transformer_for_model("gpt-4o").provider_id(),
            "openai-compatible"
        );
    }

    #[test]
    fn test_build_request_reasoning_model() {
        let config = WrapperConfig::new("openai/o3-mini", 0.3);
        let request = build_request(&config, vec![], Metadata::new());
        assert_eq!(request.model, "o3-mini");
        assert_eq!(request.temperature, None);
        assert_eq!(request.reasoning_effort, Some(ReasoningEffort::Medium));
        assert_eq!(request.max_retries, 3);
    }

    #[test]
    fn test_build_request_standard_model() {
        let config = WrapperConfig::new("gemini/gemini-1.5-flash", 0.3);
        let request = build_request(&config, vec![], Metadata::new());
        assert_eq!(request.model, "gemini-1.5-flash");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.reasoning_effort, None);
    }
}
