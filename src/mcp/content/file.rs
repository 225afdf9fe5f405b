//! MIME detection for uploads and generated files.

use crate::merge::batch::ZIP_MIME;
use crate::merge::docx::DOCX_MIME;

/// MIME type guessed from a filename's extension.
pub fn detect_mime_type(filename: &str) -> String {
    let lower = filename.to_lowercase();
    if lower.ends_with(".docx") {
        return DOCX_MIME.to_string();
    }
    mime_guess::from_path(&lower)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// MIME type sniffed from magic bytes.
pub fn detect_mime_from_bytes(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"PK\x03\x04") {
        return Some(ZIP_MIME);
    }
    None
}

/// Whether `data` looks like an image a banner can be made from.
pub fn is_banner_image(data: &[u8]) -> bool {
    matches!(detect_mime_from_bytes(data), Some("image/png" | "image/jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_type() {
        assert_eq!(detect_mime_type("Jane Doe.DOCX"), DOCX_MIME);
        assert_eq!(detect_mime_type("letters_output.zip"), "application/zip");
        assert_eq!(detect_mime_type("upper banner.png"), "image/png");
        assert_eq!(detect_mime_type("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_detect_mime_from_bytes() {
        assert_eq!(
            detect_mime_from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some("image/png")
        );
        assert_eq!(detect_mime_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_mime_from_bytes(b"PK\x03\x04rest"), Some("application/zip"));
        assert_eq!(detect_mime_from_bytes(b"GIF89a"), None);
        assert!(!is_banner_image(b"PK\x03\x04"));
    }
}
