use std::io::{Read, Write};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder, ImageResult, Rgb, RgbImage};

use super::error::InfrastructureError;
use super::staging::StagingArea;
use crate::domain::image::{Dimension, OutputFormat, MAX_PIXELS};
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::scaling::{ColorDepth, DownscaleQuality, Interpolation, ScalingOptions};

// アップロード用ストリームを作るときの JPEG 品質 (ImageIO の既定値と同じ)
const DEFAULT_JPEG_QUALITY: u8 = 75;

pub struct DefaultImageProcessor {
    staging: StagingArea,
}

impl DefaultImageProcessor {
    pub fn new(staging: StagingArea) -> Self {
        Self { staging }
    }
}

impl Default for DefaultImageProcessor {
    fn default() -> Self {
        Self::new(StagingArea::Memory)
    }
}

impl ImageProcessor for DefaultImageProcessor {
    // 白で塗りつぶしたキャンバスに元画像を合成し、アルファを捨てる
    fn to_opaque_rgb(&self, image: &DynamicImage) -> DynamicImage {
        let source = image.to_rgba8();
        let (width, height) = source.dimensions();
        let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for (x, y, pixel) in source.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            canvas.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
        }
        DynamicImage::ImageRgb8(canvas)
    }

    fn reencode_at_quality(
        &self,
        image: &DynamicImage,
        quality: f32,
        format: OutputFormat,
    ) -> Result<DynamicImage, InfrastructureError> {
        if !quality.is_finite() || quality <= 0.0 {
            return Err(InfrastructureError::ImageProcessingError(format!(
                "quality must be greater than 0, got {}",
                quality
            )));
        }
        if quality >= 1.0 {
            return Ok(image.clone());
        }
        let reencoded = self
            .staging
            .round_trip(format.image_format(), |w| write_encoded(image, format, Some(quality), w))?;
        log::debug!(
            "Re-encoded {}x{} image as {} at quality {}",
            reencoded.width(),
            reencoded.height(),
            format.extension(),
            quality
        );
        Ok(reencoded)
    }

    fn scale_all(
        &self,
        image: &DynamicImage,
        dimensions: &[Dimension],
        format: OutputFormat,
    ) -> Result<Vec<DynamicImage>, InfrastructureError> {
        if dimensions.is_empty() {
            return Ok(Vec::new());
        }
        // 確保に失敗すると abort するので、縮小前に全サイズを確認する
        for dimension in dimensions {
            check_pixel_budget(dimension.width(), dimension.height())?;
        }
        let options = ScalingOptions::for_format(format);
        let source = convert_color_depth(image, options.color_depth);
        if source.width() == 0 || source.height() == 0 {
            return Err(InfrastructureError::ImageProcessingError(
                "cannot scale an empty image".to_string(),
            ));
        }

        // 縮小用のピラミッドは全サイズで共有する
        let levels = match options.downscale_quality {
            DownscaleQuality::HighQuality => build_pyramid(source, smallest_target(dimensions)),
            DownscaleQuality::LowQuality => vec![source],
        };
        let filter = interpolation_filter(options.interpolation);

        // dimensions を順に map するので出力は入力と同じ順序・件数になる
        let scaled = dimensions
            .iter()
            .map(|dimension| {
                let level = pick_level(&levels, *dimension);
                if level.width() == dimension.width() && level.height() == dimension.height() {
                    level.clone()
                } else {
                    level.resize_exact(dimension.width(), dimension.height(), filter)
                }
            })
            .collect();
        Ok(scaled)
    }

    fn scale_one(
        &self,
        image: &DynamicImage,
        dimension: Dimension,
        format: OutputFormat,
    ) -> Result<DynamicImage, InfrastructureError> {
        self.scale_all(image, &[dimension], format)?
            .pop()
            .ok_or_else(|| InfrastructureError::ImageProcessingError("scaling produced no image".to_string()))
    }

    fn to_stream(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> Result<Box<dyn Read + Send>, InfrastructureError> {
        self.staging.into_stream(|w| write_encoded(image, format, None, w))
    }
}

pub(crate) fn check_pixel_budget(width: u32, height: u32) -> Result<(), InfrastructureError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        return Err(InfrastructureError::ImageProcessingError(format!(
            "{}x{} exceeds the limit of {} pixels",
            width, height, MAX_PIXELS
        )));
    }
    Ok(())
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

fn convert_color_depth(image: &DynamicImage, depth: ColorDepth) -> DynamicImage {
    match (depth, image) {
        (ColorDepth::Rgb8, DynamicImage::ImageRgb8(_)) | (ColorDepth::Rgba8, DynamicImage::ImageRgba8(_)) => image.clone(),
        (ColorDepth::Rgb8, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (ColorDepth::Rgba8, _) => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

fn interpolation_filter(interpolation: Interpolation) -> FilterType {
    match interpolation {
        Interpolation::NearestNeighbor => FilterType::Nearest,
        Interpolation::Bilinear => FilterType::Triangle,
        Interpolation::Bicubic => FilterType::CatmullRom,
    }
}

fn smallest_target(dimensions: &[Dimension]) -> (u32, u32) {
    let width = dimensions.iter().map(Dimension::width).min().unwrap_or(1);
    let height = dimensions.iter().map(Dimension::height).min().unwrap_or(1);
    (width, height)
}

// 半分ずつ縮小した段階画像を作る。最小ターゲットを下回る手前で止める
fn build_pyramid(source: DynamicImage, (min_width, min_height): (u32, u32)) -> Vec<DynamicImage> {
    let mut levels = vec![source];
    loop {
        let last = &levels[levels.len() - 1];
        let (half_width, half_height) = (last.width() / 2, last.height() / 2);
        if half_width < min_width || half_height < min_height || half_width == 0 || half_height == 0 {
            break;
        }
        let next = last.resize_exact(half_width, half_height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

// ターゲットを覆える一番小さい段を選ぶ (拡大が必要なら元画像)
fn pick_level(levels: &[DynamicImage], dimension: Dimension) -> &DynamicImage {
    levels
        .iter()
        .rev()
        .find(|level| level.width() >= dimension.width() && level.height() >= dimension.height())
        .unwrap_or(&levels[0])
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn png_compression(quality: f32) -> CompressionType {
    if quality < 0.5 {
        CompressionType::Best
    } else {
        CompressionType::Default
    }
}

pub(crate) fn write_encoded(
    image: &DynamicImage,
    format: OutputFormat,
    quality: Option<f32>,
    mut writer: &mut dyn Write,
) -> ImageResult<()> {
    match format {
        OutputFormat::Jpg => {
            let rgb = image.to_rgb8();
            let quality = quality.map(jpeg_quality).unwrap_or(DEFAULT_JPEG_QUALITY);
            JpegEncoder::new_with_quality(&mut writer, quality).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ColorType::Rgb8,
            )
        }
        OutputFormat::Png => {
            let compression = quality.map(png_compression).unwrap_or(CompressionType::Default);
            let encoder = PngEncoder::new_with_quality(&mut writer, compression, PngFilterType::Adaptive);
            if image.color().has_alpha() {
                let rgba = image.to_rgba8();
                encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
            } else {
                let rgb = image.to_rgb8();
                encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            }
        }
    }
}
