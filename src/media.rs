//! Pre-dispatch media validation.
//!
//! A request that fails these checks never reaches an agent: the caller
//! gets a structured error instead of four synthesized agent failures.

use std::path::Path;

use crate::error::AnalysisError;
use crate::models::MediaType;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac"];

/// Detect the media type from the file extension.
pub fn detect_media_type(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Audio)
    } else {
        None
    }
}

/// Validate a media file before dispatch.
///
/// Checks existence, the size cap, and (unless `declared` overrides
/// detection) that the extension maps to a known media type.
pub fn validate_media(
    path: &Path,
    max_file_size: u64,
    declared: Option<MediaType>,
) -> Result<MediaType, AnalysisError> {
    if !path.is_file() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    let size = std::fs::metadata(path)
        .map_err(|_| AnalysisError::FileNotFound(path.to_path_buf()))?
        .len();
    if size > max_file_size {
        return Err(AnalysisError::FileTooLarge {
            size,
            limit: max_file_size,
        });
    }

    match declared {
        Some(media_type) => Ok(media_type),
        None => detect_media_type(path).ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string();
            AnalysisError::UnsupportedMediaType(ext)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_media_type() {
        assert_eq!(
            detect_media_type(Path::new("clip.mp4")),
            Some(MediaType::Video)
        );
        assert_eq!(
            detect_media_type(Path::new("photo.JPEG")),
            Some(MediaType::Image)
        );
        assert_eq!(
            detect_media_type(Path::new("voice.wav")),
            Some(MediaType::Audio)
        );
        assert_eq!(detect_media_type(Path::new("notes.txt")), None);
        assert_eq!(detect_media_type(Path::new("no_extension")), None);
    }

    #[test]
    fn test_missing_file_short_circuits() {
        let err = validate_media(Path::new("/nonexistent/clip.mp4"), 1024, None).unwrap_err();
        assert!(matches!(err, AnalysisError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = validate_media(&path, 1024, None).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_declared_type_overrides_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_capture.bin");
        std::fs::write(&path, b"frames").unwrap();

        let media_type = validate_media(&path, 1024, Some(MediaType::Video)).unwrap();
        assert_eq!(media_type, MediaType::Video);
    }

    #[test]
    fn test_size_cap_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.mp4");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0u8; 64]).unwrap();

        let err = validate_media(&path, 16, None).unwrap_err();
        assert!(matches!(err, AnalysisError::FileTooLarge { size: 64, .. }));

        let ok = validate_media(&path, 1024, None).unwrap();
        assert_eq!(ok, MediaType::Video);
    }
}
