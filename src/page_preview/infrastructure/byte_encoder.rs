use std::io::{Cursor, Read};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::error::InfrastructureError;
use super::image_processor::check_pixel_budget;
use crate::domain::collaborator_traits::ByteEncoder;

// バイト列をデコードし、指定サイズに合わせて mime type の形式で書き出す
pub struct ResizingByteEncoder;

impl ResizingByteEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResizingByteEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn format_for_mime(mime_type: &str) -> Option<ImageFormat> {
    match mime_type.to_lowercase().as_str() {
        "image/jpg" | "image/jpeg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        _ => None,
    }
}

impl ByteEncoder for ResizingByteEncoder {
    fn encode(
        &self,
        mime_type: &str,
        mut source: Box<dyn Read + Send>,
        destination: &mut Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<(), InfrastructureError> {
        let format = format_for_mime(mime_type).ok_or_else(|| {
            InfrastructureError::EncodingError(format!("unsupported mime type: {}", mime_type))
        })?;
        if width == 0 || height == 0 {
            return Err(InfrastructureError::EncodingError(format!(
                "target size must be positive, got {}x{}",
                width, height
            )));
        }
        check_pixel_budget(width, height)?;

        let mut raw = Vec::new();
        source.read_to_end(&mut raw)?;
        drop(source);

        let decoded = image::load_from_memory(&raw)?;
        let resized = if decoded.width() == width && decoded.height() == height {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };
        let resized = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };

        let mut cursor = Cursor::new(destination);
        resized.write_to(&mut cursor, format)?;
        Ok(())
    }
}
