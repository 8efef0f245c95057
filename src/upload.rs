//! Image bytes to displayable URL.
//!
//! Adding a floating image (or filling a block image) first turns the raw
//! file bytes into a URL. A host with an upload service plugs in its own
//! [`ImageUploader`]; without one, [`DataUrlUploader`] inlines the bytes as a
//! `data:` URL so the same flow still works offline.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use base64::{Engine as _, engine::general_purpose};

/// Why an image could not be turned into a URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("image is empty")]
    Empty,
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Resolves image bytes to a durable URL.
///
/// The browser host is single-threaded, so futures are not required to be `Send`.
#[async_trait::async_trait(?Send)]
pub trait ImageUploader {
    /// Upload `bytes` and return the URL they can be displayed from.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] when the bytes are unusable or the upload fails.
    async fn upload(&self, bytes: &[u8]) -> Result<String, UploadError>;
}

/// Fallback uploader that encodes the bytes into a `data:` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlUploader;

#[async_trait::async_trait(?Send)]
impl ImageUploader for DataUrlUploader {
    async fn upload(&self, bytes: &[u8]) -> Result<String, UploadError> {
        data_url(bytes)
    }
}

/// Encode `bytes` as a `data:<mime>;base64,...` URL.
///
/// # Errors
///
/// Returns [`UploadError::Empty`] for empty input.
pub fn data_url(bytes: &[u8]) -> Result<String, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    let b64 = general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{b64}", sniff_mime(bytes)))
}

/// Guess an image MIME type from magic bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"BM") {
        "image/bmp"
    } else if looks_like_svg(bytes) {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

/// Resolve `bytes` through `uploader`, or the data-URL fallback when there is none.
///
/// Failures are logged and yield `None`; the caller then adds nothing.
pub async fn resolve_image_url(uploader: Option<&dyn ImageUploader>, bytes: &[u8]) -> Option<String> {
    let result = match uploader {
        Some(uploader) => uploader.upload(bytes).await,
        None => DataUrlUploader.upload(bytes).await,
    };
    match result {
        Ok(url) if !url.is_empty() => Some(url),
        Ok(_) => {
            tracing::warn!(len = bytes.len(), "image upload returned an empty url");
            None
        }
        Err(e) => {
            tracing::warn!(len = bytes.len(), error = %e, "image upload failed");
            None
        }
    }
}
