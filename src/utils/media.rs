//! Media encoding helpers
//!
//! Local files and in-memory images are turned into base64 data URLs; URLs and
//! base64 strings supplied by the caller are passed through untouched.

use std::path::Path;

use base64::Engine;

use crate::error::LlmError;
use crate::types::{InMemoryImage, MessageContent};

/// Base64-encode raw bytes with the standard alphabet.
pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Read and base64-encode a local file.
pub fn encode_file(path: &Path) -> Result<String, LlmError> {
    let bytes = std::fs::read(path)
        .map_err(|e| LlmError::IoError(format!("{}: {e}", path.display())))?;
    Ok(encode_bytes(&bytes))
}

/// Build `data:{mime};base64,{payload}`.
pub fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// Split a data URL into its MIME type and payload.
pub fn parse_data_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime_type = header.split(';').next().unwrap_or_default();
    Some((mime_type.to_string(), data.to_string()))
}

/// Encode an in-memory image as a data URL.
pub fn image_data_url(image: &InMemoryImage) -> String {
    data_url(&image.mime_type(), &encode_bytes(&image.data))
}

/// Resolve media content to the string placed in the request.
///
/// Files and in-memory images become data URLs; URLs and base64 strings are
/// returned as given. A raw source string is checked against the filesystem
/// at this point, not when the message was built.
pub fn resolve_media_url(content: &MessageContent) -> Result<String, LlmError> {
    match content {
        MessageContent::Source(_) => resolve_media_url(&content.classify()),
        MessageContent::Image(image) => Ok(image_data_url(image)),
        MessageContent::Path(path) => {
            let mime_type = super::mime::mime_type_for_file(path)?;
            let encoded = encode_file(path)?;
            Ok(data_url(&mime_type, &encoded))
        }
        MessageContent::Url(url) => Ok(url.clone()),
        MessageContent::Text(text) => Err(LlmError::InvalidInput(format!(
            "text content cannot be used as media: {text}"
        ))),
    }
}
