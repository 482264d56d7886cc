//! Transformers layer
//!
//! Request transformers shape provider-neutral messages for a provider family;
//! the response transformer reads OpenAI-compatible completion bodies.

pub mod request;
pub mod response;

pub use request::{
    GeminiRequestTransformer, RequestTransformer, TextOnlyRequestTransformer,
    UniversalRequestTransformer, build_request, transformer_for_model,
};
pub use response::{extract_error_message, transform_chat_response};
