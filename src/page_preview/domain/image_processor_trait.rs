use std::io::Read;

use image::DynamicImage;

use crate::domain::image::{Dimension, OutputFormat};
use crate::infrastructure::error::InfrastructureError;

// 変換・画質調整・複数サイズ縮小をまとめたトレイト
// 各メソッドは新しい画像を返し、入力は変更しない
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    fn to_opaque_rgb(&self, image: &DynamicImage) -> DynamicImage;

    fn reencode_at_quality(
        &self,
        image: &DynamicImage,
        quality: f32,
        format: OutputFormat,
    ) -> Result<DynamicImage, InfrastructureError>;

    fn scale_all(
        &self,
        image: &DynamicImage,
        dimensions: &[Dimension],
        format: OutputFormat,
    ) -> Result<Vec<DynamicImage>, InfrastructureError>;

    fn scale_one(
        &self,
        image: &DynamicImage,
        dimension: Dimension,
        format: OutputFormat,
    ) -> Result<DynamicImage, InfrastructureError>;

    fn to_stream(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> Result<Box<dyn Read + Send>, InfrastructureError>;
}
