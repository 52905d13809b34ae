use image::ImageFormat;

use super::error::DomainError;

// 1 枚あたりの上限ピクセル数 (RGBA で約 400MB)
pub const MAX_PIXELS: u64 = 100_000_000;

// 出力サイズ。幅・高さともに正の値のみ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    width: u32,
    height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::invalid(format!(
                "dimension must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Output format of a generated preview. Determines the file extension and
/// the mime type sent to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpg,
    Png,
}

impl OutputFormat {
    pub fn from_jpg_flag(is_jpg: bool) -> Self {
        if is_jpg {
            OutputFormat::Jpg
        } else {
            OutputFormat::Png
        }
    }

    pub fn is_jpg(&self) -> bool {
        matches!(self, OutputFormat::Jpg)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    // "image/" + 拡張子 (image/jpeg ではなく image/jpg になる点に注意)
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "image/jpg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }

    pub fn file_name(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }
}
