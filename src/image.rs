use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

const FALLBACK_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

pub fn to_image_url(raw: &str) -> Result<String, ImageError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("data:")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("http://")
    {
        return Ok(trimmed.to_string());
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(&compact)?;
    Ok(format!("data:{};base64,{compact}", sniff_mime(&bytes)))
}

pub fn encode_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => FALLBACK_MIME,
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => FALLBACK_MIME,
    }
}
