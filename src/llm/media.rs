use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};

/// An uploaded image: raw bytes plus the MIME type reported to Gemini.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MediaFile {
    pub fn new(bytes: Vec<u8>, mime_type: String) -> Self {
        Self { bytes, mime_type }
    }
}

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    // `infer` does not know the HEIC container, so sniff the ftyp brand first.
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

fn normalize_image_mime_type(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        _ => lowered,
    }
}

fn gemini_supports_image_mime(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png" | "image/jpeg" | "image/webp" | "image/heic" | "image/heif"
    )
}

/// Picks a Gemini-accepted MIME type for the image, preferring the declared
/// type and falling back to content sniffing.
pub fn gemini_image_mime(declared: Option<&str>, bytes: &[u8]) -> Result<String> {
    let mut candidates = Vec::new();
    if let Some(declared) = declared {
        if !declared.trim().is_empty() {
            candidates.push(declared.to_string());
        }
    }
    if let Some(detected) = detect_mime_type(bytes) {
        candidates.push(detected);
    }

    for candidate in candidates {
        let normalized = normalize_image_mime_type(&candidate);
        if gemini_supports_image_mime(&normalized) {
            return Ok(normalized);
        }
    }

    Err(anyhow!("image format is not supported by Gemini"))
}

/// Parses an RFC 2397 data URI (`data:image/png;base64,...`) into a media
/// file. The declared MIME type is cross-checked against the decoded bytes.
pub fn media_from_data_uri(uri: &str) -> Result<MediaFile> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI is missing the payload separator"))?;

    if !header.ends_with(";base64") {
        return Err(anyhow!("only base64 data URIs are supported"));
    }
    let declared = header.trim_end_matches(";base64");
    let declared = if declared.is_empty() {
        None
    } else {
        Some(declared)
    };

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .context("data URI payload is not valid base64")?;
    let mime_type = gemini_image_mime(declared, &bytes)?;
    Ok(MediaFile::new(bytes, mime_type))
}

/// Loads the image referenced on the command line: a data URI or a file path.
pub async fn load_image(reference: &str) -> Result<MediaFile> {
    if reference.starts_with("data:") {
        return media_from_data_uri(reference);
    }

    let path = Path::new(reference);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    if bytes.is_empty() {
        return Err(anyhow!("image {} is empty", path.display()));
    }
    let mime_type = gemini_image_mime(None, &bytes)?;
    Ok(MediaFile::new(bytes, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52,
    ];

    #[test]
    fn detects_png_from_magic_bytes() {
        assert_eq!(detect_mime_type(PNG_HEADER).as_deref(), Some("image/png"));
    }

    #[test]
    fn normalizes_legacy_jpg_mime_alias() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];
        let mime = gemini_image_mime(Some("image/jpg"), &jpeg).unwrap();
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn rejects_unsupported_formats() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
        assert!(gemini_image_mime(None, gif).is_err());
    }

    #[test]
    fn parses_base64_data_uri() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(PNG_HEADER);
        let uri = format!("data:image/png;base64,{encoded}");
        let media = media_from_data_uri(&uri).unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.bytes, PNG_HEADER);
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert!(media_from_data_uri("data:image/png,plain-text").is_err());
        assert!(media_from_data_uri("file.png").is_err());
    }
}
