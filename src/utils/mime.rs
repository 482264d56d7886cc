//! MIME type detection utilities

use std::path::Path;

use crate::error::LlmError;

/// Extensions accepted as images even when the extension table has no entry.
const IMAGE_FALLBACK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file path or URL (extension-based)
pub fn guess_mime_from_path_or_url(path_or_url: &str) -> Option<String> {
    mime_guess::from_path(path_or_url)
        .first_raw()
        .map(|s| s.to_string())
}

/// MIME type of a local media file, derived from its extension.
///
/// Falls back to `image/{ext}` for common image extensions and fails with
/// [`LlmError::UnsupportedFileType`] otherwise.
pub fn mime_type_for_file(path: &Path) -> Result<String, LlmError> {
    let display = path.display().to_string();
    if let Some(mime) = guess_mime_from_path_or_url(&display) {
        return Ok(mime);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension {
        Some(ext) if IMAGE_FALLBACK_EXTENSIONS.contains(&ext.as_str()) => {
            Ok(format!("image/{ext}"))
        }
        _ => Err(LlmError::UnsupportedFileType(display)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_from_path() {
        assert_eq!(
            guess_mime_from_path_or_url("photo.png"),
            Some("image/png".to_string())
        );
        assert_eq!(
            guess_mime_from_path_or_url("song.mp3"),
            Some("audio/mpeg".to_string())
        );
        assert_eq!(
            guess_mime_from_path_or_url("video.mp4"),
            Some("video/mp4".to_string())
        );
        assert_eq!(guess_mime_from_path_or_url("file.unknownext"), None);
    }

    #[test]
    fn test_mime_type_for_file() {
        assert_eq!(
            mime_type_for_file(Path::new("/tmp/scene.JPG")).unwrap(),
            "image/jpeg"
        );
        assert_eq!(
            mime_type_for_file(Path::new("narration.wav")).unwrap(),
            "audio/wav"
        );

        let err = mime_type_for_file(Path::new("notes.unknownext")).unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedFileType(_)));

        let err = mime_type_for_file(Path::new("no_extension")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: no_extension");
    }
}
