use image::DynamicImage;

use super::error::DomainError;
use super::image::{Dimension, OutputFormat};

// レンダリング結果と、どちらの経路で取得したか
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: DynamicImage,
    pub used_fallback: bool,
}

impl RenderedPage {
    pub fn from_renderer(image: DynamicImage) -> Self {
        Self {
            image,
            used_fallback: false,
        }
    }

    pub fn from_snapshot_service(image: DynamicImage) -> Self {
        Self {
            image,
            used_fallback: true,
        }
    }

    // 外部サービス経由の場合は常に JPG
    pub fn output_format(&self, requested_jpg: bool) -> OutputFormat {
        if self.used_fallback {
            OutputFormat::Jpg
        } else {
            OutputFormat::from_jpg_flag(requested_jpg)
        }
    }
}

/// Result of one `generate_previews` call. Holds the per-call bookkeeping
/// (format, fallback usage) that decides how the result is uploaded.
#[derive(Debug, Clone)]
pub struct PreviewBatch {
    pub images: Vec<DynamicImage>,
    pub format: OutputFormat,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    pub encode: bool,
    pub make_jpg: bool,
    pub quality: f32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            encode: false,
            make_jpg: true,
            quality: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub url: String,
    pub file_name: String,
    pub upload_directory: String,
    pub width: u32,
    pub height: u32,
    pub options: PreviewOptions,
}

impl PreviewRequest {
    pub fn new(
        url: impl Into<String>,
        file_name: impl Into<String>,
        upload_directory: impl Into<String>,
        width: u32,
        height: u32,
        options: PreviewOptions,
    ) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
            upload_directory: upload_directory.into(),
            width,
            height,
            options,
        }
    }

    pub fn validate(&self) -> Result<Dimension, DomainError> {
        require_non_empty("url", &self.url)?;
        require_non_empty("file name", &self.file_name)?;
        require_non_empty("upload directory", &self.upload_directory)?;
        validate_quality(self.options.quality)?;
        Dimension::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPreviewRequest {
    pub urls: Vec<String>,
    pub names: Vec<String>,
    pub upload_directory: String,
    pub width: u32,
    pub height: u32,
    pub options: PreviewOptions,
}

impl BatchPreviewRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.urls.len() != self.names.len() {
            return Err(DomainError::invalid(format!(
                "urls and names differ in length: {} vs {}",
                self.urls.len(),
                self.names.len()
            )));
        }
        require_non_empty("upload directory", &self.upload_directory)?;
        validate_quality(self.options.quality)?;
        Dimension::new(self.width, self.height)?;
        Ok(())
    }

    // urls と names を組にして単一リクエストへ展開
    pub fn requests(&self) -> impl Iterator<Item = PreviewRequest> + '_ {
        self.urls
            .iter()
            .zip(self.names.iter())
            .map(move |(url, name)| {
                PreviewRequest::new(
                    url.clone(),
                    name.clone(),
                    self.upload_directory.clone(),
                    self.width,
                    self.height,
                    self.options,
                )
            })
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

// 1 以上は「調整なし」。0 以下と NaN は不正
pub(crate) fn validate_quality(quality: f32) -> Result<(), DomainError> {
    if !quality.is_finite() || quality <= 0.0 {
        return Err(DomainError::invalid(format!(
            "quality must be greater than 0, got {}",
            quality
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn request() -> PreviewRequest {
        PreviewRequest::new(
            "http://example.com",
            "home",
            "/previews",
            200,
            150,
            PreviewOptions::default(),
        )
    }

    #[test]
    fn test_fallback_forces_jpg() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        assert_eq!(
            RenderedPage::from_snapshot_service(image.clone()).output_format(false),
            OutputFormat::Jpg
        );
        assert_eq!(
            RenderedPage::from_renderer(image).output_format(false),
            OutputFormat::Png
        );
    }

    #[test]
    fn test_request_validation() {
        assert!(request().validate().is_ok());

        let mut empty_url = request();
        empty_url.url.clear();
        assert!(empty_url.validate().is_err());

        let mut no_dir = request();
        no_dir.upload_directory = String::new();
        assert!(no_dir.validate().is_err());

        let mut zero_width = request();
        zero_width.width = 0;
        assert!(zero_width.validate().is_err());

        let mut bad_quality = request();
        bad_quality.options.quality = 0.0;
        assert!(bad_quality.validate().is_err());
        bad_quality.options.quality = f32::NAN;
        assert!(bad_quality.validate().is_err());
    }

    #[test]
    fn test_batch_validation_and_expansion() {
        let batch = BatchPreviewRequest {
            urls: vec!["a".to_string(), "b".to_string()],
            names: vec!["n1".to_string()],
            upload_directory: "/previews".to_string(),
            width: 100,
            height: 100,
            options: PreviewOptions::default(),
        };
        assert!(matches!(batch.validate(), Err(DomainError::InvalidInput(_))));

        let batch = BatchPreviewRequest {
            names: vec!["n1".to_string(), "n2".to_string()],
            ..batch
        };
        assert!(batch.validate().is_ok());
        let expanded: Vec<_> = batch.requests().collect();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[1].url, "b");
        assert_eq!(expanded[1].file_name, "n2");
    }
}
