//! Proof image upload validation and storage.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::{info, warn};

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted declared content types.
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Empty file")]
    Empty,

    #[error("File too large. Maximum size is {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("Invalid file type. Allowed types: {}", ALLOWED_MIME_TYPES.join(", "))]
    UnsupportedType,

    #[error("Failed to save upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated image ready to be stored or sent to the verifier.
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

fn format_info(format: ImageFormat) -> Option<(&'static str, &'static str)> {
    match format {
        ImageFormat::Jpeg => Some(("image/jpeg", "jpg")),
        ImageFormat::Png => Some(("image/png", "png")),
        ImageFormat::WebP => Some(("image/webp", "webp")),
        ImageFormat::Gif => Some(("image/gif", "gif")),
        _ => None,
    }
}

/// Check size, declared type and actual content of an uploaded image.
///
/// `declared` is the multipart content type, if the client sent one. The
/// stored MIME type always comes from the sniffed bytes.
pub fn validate_image(bytes: Vec<u8>, declared: Option<&str>) -> Result<ValidatedImage, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    if let Some(declared) = declared
        && !ALLOWED_MIME_TYPES.contains(&declared.to_ascii_lowercase().as_str())
    {
        return Err(UploadError::UnsupportedType);
    }
    let format = image::guess_format(&bytes).map_err(|_| UploadError::UnsupportedType)?;
    let (mime_type, extension) = format_info(format).ok_or(UploadError::UnsupportedType)?;
    Ok(ValidatedImage {
        bytes,
        mime_type,
        extension,
    })
}

/// Write `image` under `upload_dir/<quest_id>/` with a unique filename.
///
/// Returns the path of the stored file.
pub async fn save_image(
    upload_dir: &Path,
    quest_id: &str,
    image: &ValidatedImage,
) -> Result<PathBuf, UploadError> {
    // quest ids are generated server-side but arrive here from a form field
    let safe_dir: String = quest_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let dir = upload_dir.join(if safe_dir.is_empty() { "unknown" } else { &safe_dir });
    tokio::fs::create_dir_all(&dir).await?;

    let path = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), image.extension));
    tokio::fs::write(&path, &image.bytes).await?;
    info!(path = %path.display(), size = image.bytes.len(), "proof image stored");
    Ok(path)
}

/// Delete a stored image whose submission was not recorded.
pub async fn remove_image(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "orphaned proof image removed"),
        Err(e) => warn!(error = %e, path = %path.display(), "could not remove proof image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn empty_upload_rejected() {
        assert!(matches!(validate_image(Vec::new(), None), Err(UploadError::Empty)));
    }

    #[test]
    fn oversized_upload_rejected() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        assert!(matches!(
            validate_image(bytes, Some("image/png")),
            Err(UploadError::TooLarge)
        ));
    }

    #[test]
    fn declared_type_must_be_an_image() {
        assert!(matches!(
            validate_image(PNG_MAGIC.to_vec(), Some("application/pdf")),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn content_is_sniffed() {
        let img = validate_image(JPEG_MAGIC.to_vec(), Some("image/jpg")).unwrap();
        assert_eq!(img.mime_type, "image/jpeg");
        assert_eq!(img.extension, "jpg");

        assert!(matches!(
            validate_image(b"not an image at all".to_vec(), Some("image/png")),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[tokio::test]
    async fn saved_under_quest_directory() {
        let dir = tempfile::tempdir().unwrap();
        let img = validate_image(PNG_MAGIC.to_vec(), None).unwrap();
        let path = save_image(dir.path(), "quest_1a2b3c4d", &img).await.unwrap();
        assert!(path.starts_with(dir.path().join("quest_1a2b3c4d")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn path_traversal_in_quest_id_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let img = validate_image(PNG_MAGIC.to_vec(), None).unwrap();
        let path = save_image(dir.path(), "../../etc", &img).await.unwrap();
        assert!(path.starts_with(dir.path().join("etc")));
    }

    #[tokio::test]
    async fn removed_image_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let img = validate_image(PNG_MAGIC.to_vec(), None).unwrap();
        let path = save_image(dir.path(), "quest_1a2b3c4d", &img).await.unwrap();
        remove_image(&path).await;
        assert!(!path.exists());
        // already gone
        remove_image(&path).await;
    }
}
