//! Mock API tests for the DeepSeek wrapper

mod support;

use mllm_tools::prelude::*;
use mllm_tools::{WrapperConfig, deepseek};
use serde_json::{Value, json};
use support::{chat_completion_response, mock_config};
use tracing_test::traced_test;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(content: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_response(Some(content))))
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_prefixed_model_is_sent_bare() {
    let mock_server = setup("Bonjour").await;

    let mut llm =
        DeepSeekWrapper::from_config(mock_config("deepseek/deepseek-chat", &mock_server.uri()));
    let text = llm.call(&[Message::text("Translate hello")], None).await;
    assert_eq!(text, "Bonjour");

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], deepseek::CHAT);
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": [{"type": "text", "text": "Translate hello"}]}])
    );
}

#[tokio::test]
#[traced_test]
async fn test_media_messages_are_dropped() {
    let mock_server = setup("text only").await;

    let mut llm = DeepSeekWrapper::from_config(mock_config(deepseek::CHAT, &mock_server.uri()));
    let text = llm
        .call(
            &[
                Message::text("Describe"),
                Message::image("https://example.com/cat.png"),
            ],
            None,
        )
        .await;
    assert_eq!(text, "text only");

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert!(logs_contain("model accepts text only"));
}

#[tokio::test]
async fn test_cost_tracking() {
    let mock_server = setup("ok").await;

    let config = WrapperConfig {
        print_cost: true,
        ..mock_config(deepseek::CHAT, &mock_server.uri())
    };
    let mut llm = DeepSeekWrapper::from_config(config);
    llm.call(&[Message::text("Hi")], None).await;
    assert!(llm.accumulated_cost() > 0.0);
}
