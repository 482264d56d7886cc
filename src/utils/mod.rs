//! Utility modules for mllm-tools

pub mod media;
pub mod mime;

pub use media::{data_url, encode_file, parse_data_url, resolve_media_url};
pub use mime::mime_type_for_file;
