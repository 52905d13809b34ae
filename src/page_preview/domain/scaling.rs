use super::image::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Rgb8,
    Rgba8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownscaleQuality {
    // 段階的に半分ずつ縮小してから最終サイズへ
    HighQuality,
    // 元画像から一度で縮小
    LowQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    NearestNeighbor,
    Bilinear,
    Bicubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingOptions {
    pub color_depth: ColorDepth,
    pub downscale_quality: DownscaleQuality,
    pub interpolation: Interpolation,
}

impl ScalingOptions {
    // 補間は JPG/PNG どちらも最近傍 (速度優先、変更しないこと)
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpg => Self {
                color_depth: ColorDepth::Rgb8,
                downscale_quality: DownscaleQuality::HighQuality,
                interpolation: Interpolation::NearestNeighbor,
            },
            OutputFormat::Png => Self {
                color_depth: ColorDepth::Rgba8,
                downscale_quality: DownscaleQuality::LowQuality,
                interpolation: Interpolation::NearestNeighbor,
            },
        }
    }
}
