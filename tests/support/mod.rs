//! Shared fixtures for mock API tests

#![allow(dead_code)]

use mllm_tools::WrapperConfig;
use serde_json::json;

/// OpenAI-compatible chat completion body
pub fn chat_completion_response(content: Option<&str>) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 1000,
            "completion_tokens": 500,
            "total_tokens": 1500
        }
    })
}

/// OpenAI-style error body
pub fn error_response(error_type: &str, message: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": null,
            "code": code
        }
    })
}

/// Config pointed at a mock server, telemetry off
pub fn mock_config(model: &str, base_url: &str) -> WrapperConfig {
    WrapperConfig::builder()
        .model_name(model)
        .api_base(base_url)
        .api_key("test-api-key")
        .use_langfuse(false)
        .build()
        .unwrap()
}

/// Smallest valid PNG header
pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
