use super::*;

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

struct FixedUploader(&'static str);

#[async_trait::async_trait(?Send)]
impl ImageUploader for FixedUploader {
    async fn upload(&self, _bytes: &[u8]) -> Result<String, UploadError> {
        Ok(self.0.to_string())
    }
}

struct RejectingUploader;

#[async_trait::async_trait(?Send)]
impl ImageUploader for RejectingUploader {
    async fn upload(&self, _bytes: &[u8]) -> Result<String, UploadError> {
        Err(UploadError::Rejected("quota exceeded".into()))
    }
}

// =============================================================
// MIME sniffing
// =============================================================

#[test]
fn sniff_known_formats() {
    assert_eq!(sniff_mime(PNG_HEADER), "image/png");
    assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(sniff_mime(b"GIF89a...."), "image/gif");
    assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
    assert_eq!(sniff_mime(b"BM\x00\x00"), "image/bmp");
    assert_eq!(sniff_mime(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>"), "image/svg+xml");
    assert_eq!(sniff_mime(b"<?xml version=\"1.0\"?><svg/>"), "image/svg+xml");
}

#[test]
fn sniff_unknown_is_octet_stream() {
    assert_eq!(sniff_mime(b"hello"), "application/octet-stream");
    assert_eq!(sniff_mime(b"RIFF"), "application/octet-stream");
}

// =============================================================
// Data URLs
// =============================================================

#[test]
fn data_url_encodes_with_mime() {
    let url = data_url(b"GIF89a").unwrap();
    assert_eq!(url, "data:image/gif;base64,R0lGODlh");
}

#[test]
fn data_url_rejects_empty() {
    assert_eq!(data_url(&[]), Err(UploadError::Empty));
}

// =============================================================
// Resolution
// =============================================================

#[tokio::test]
async fn resolve_without_uploader_inlines_bytes() {
    let url = resolve_image_url(None, PNG_HEADER).await.unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn resolve_uses_uploader_url() {
    let uploader = FixedUploader("https://cdn.test/a.png");
    let url = resolve_image_url(Some(&uploader), PNG_HEADER).await;
    assert_eq!(url.as_deref(), Some("https://cdn.test/a.png"));
}

#[tokio::test]
async fn resolve_failure_yields_none() {
    assert_eq!(resolve_image_url(Some(&RejectingUploader), PNG_HEADER).await, None);
    assert_eq!(resolve_image_url(Some(&FixedUploader("")), PNG_HEADER).await, None);
    assert_eq!(resolve_image_url(None, &[]).await, None);
}
