//! # mllm-tools - Uniform Multimodal Completions
//!
//! A thin adapter that sends text, image, audio and video inputs to several
//! LLM providers through one calling convention.
//!
//! ## Features
//!
//! - **One message format**: `{type, content}` messages, with local files and
//!   in-memory images base64-encoded into data URLs.
//! - **Provider routing**: `provider/model` names pick the endpoint,
//!   credentials and media part shape (OpenAI, Gemini, Anthropic, DeepSeek,
//!   OpenRouter, Azure).
//! - **Reasoning models**: o-series models get `reasoning_effort` instead of
//!   `temperature`.
//! - **Cost accounting**: per-call cost accumulated on the wrapper.
//! - **Forgiving calls**: [`CompletionWrapper::call`] never fails; errors come
//!   back as text. Use [`CompletionWrapper::try_call`] for typed errors.
//! - **Langfuse**: optional export of every generation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mllm_tools::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let config = WrapperConfig::builder()
//!         .model_name("gpt-4o")
//!         .temperature(0.7)
//!         .use_langfuse(false)
//!         .build()?;
//!     let mut llm = CompletionWrapper::new(config);
//!
//!     let answer = llm
//!         .call(
//!             &[
//!                 Message::text("What is in this picture?"),
//!                 Message::image("https://example.com/cat.png"),
//!             ],
//!             None,
//!         )
//!         .await;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod deepseek;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pricing;
pub mod provider;
pub mod retry;
pub mod telemetry;
pub mod transformers;
pub mod types;
pub mod utils;
pub mod wrapper;

pub use config::{WrapperConfig, WrapperConfigBuilder};
pub use deepseek::DeepSeekWrapper;
pub use error::{ErrorCategory, LlmError};
pub use executor::{CompletionBackend, HttpCompletionBackend};
pub use provider::ProviderFamily;
pub use types::{
    CompletionRequest, CompletionResponse, InMemoryImage, Message, MessageContent, MessageKind,
    Metadata, ReasoningEffort, Usage,
};
pub use wrapper::CompletionWrapper;

/// Commonly used items
pub mod prelude {
    pub use crate::config::WrapperConfig;
    pub use crate::deepseek::DeepSeekWrapper;
    pub use crate::error::LlmError;
    pub use crate::executor::CompletionBackend;
    pub use crate::types::{Message, MessageContent, MessageKind, Metadata};
    pub use crate::wrapper::CompletionWrapper;
}
