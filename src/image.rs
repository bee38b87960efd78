//! Saving generated images
//!
//! Decodes inline `data:` image references so cards and figures can be
//! written to disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blessing_types::ImageRef;

use crate::error::ImageError;

/// Raw bytes of an inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for the mime type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

/// Decode `data:{mime};base64,{payload}`
pub fn decode_data_uri(image: &ImageRef) -> Result<DecodedImage, ImageError> {
    if image.is_empty() {
        return Err(ImageError::Empty);
    }

    let rest = image
        .as_str()
        .strip_prefix("data:")
        .ok_or(ImageError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageError::NotDataUri)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(ImageError::NotDataUri)?;

    Ok(DecodedImage {
        mime_type: mime_type.to_string(),
        bytes: STANDARD.decode(payload)?,
    })
}

/// Suggested file name for a saved card image
pub fn card_file_name(recipient: &str, image: &DecodedImage) -> String {
    format!("blessing_{}.{}", sanitize(recipient), image.extension())
}

/// Suggested file name for a saved figure image
pub fn figure_file_name(recipient: &str, image: &DecodedImage) -> String {
    format!("blessing_figure_{}.{}", sanitize(recipient), image.extension())
}

// Path separators and control characters only; Hangul stays.
fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}
