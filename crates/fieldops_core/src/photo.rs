use crate::error::AppError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Mime type for a picked file, mirroring an `image/*` picker filter.
pub fn image_mime_for_path(path: &Path) -> Result<&'static str, AppError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| AppError::invalid_input("photo must be an image file"))?;

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        "heic" => Ok("image/heic"),
        "heif" => Ok("image/heif"),
        _ => Err(AppError::invalid_input("photo must be an image file")),
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn is_image_data_url(value: &str) -> bool {
    value.starts_with("data:image/")
}
