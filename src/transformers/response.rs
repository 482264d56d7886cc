//! Response transformation
//!
//! Converts OpenAI-compatible chat completion bodies into [`CompletionResponse`].

use serde_json::Value;

use crate::error::LlmError;
use crate::types::{CompletionResponse, Usage};

/// Parse a chat completion body.
///
/// A missing or null `choices[0].message.content` is not an error; it yields
/// `content: None`. A body without any choice is.
pub fn transform_chat_response(raw: Value) -> Result<CompletionResponse, LlmError> {
    let message = raw
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            LlmError::ParseError(format!("Response has no choices: {raw}"))
        })?;

    let content = message.get("content").and_then(content_text);

    let usage = raw
        .get("usage")
        .filter(|u| !u.is_null())
        .map(|u| serde_json::from_value::<Usage>(u.clone()))
        .transpose()?;

    let model = raw.get("model").and_then(Value::as_str).map(str::to_string);

    Ok(CompletionResponse {
        content,
        model,
        usage,
        raw,
    })
}

/// Text of a message `content`: a plain string, or the text parts of a
/// content array joined in order.
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter(|part| {
                    part.get("type").and_then(Value::as_str).unwrap_or("text") == "text"
                })
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            (!texts.is_empty()).then(|| texts.concat())
        }
        _ => None,
    }
}

/// Extract the provider's error message from an error body, if any.
pub fn extract_error_message(body: &Value) -> Option<String> {
    // OpenAI-style `{"error": {"message": ...}}`; some gateways wrap a list
    let error = match body {
        Value::Array(items) => items.first()?.get("error")?,
        _ => body.get("error")?,
    };
    match error {
        Value::String(message) => Some(message.clone()),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
