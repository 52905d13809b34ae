use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;

use super::config::GeneratorConfig;
use super::error::ApplicationError;
use super::fallback_resolver::FallbackResolver;
use super::upload_stage::UploadStage;
use crate::domain::collaborator_traits::{FileStorage, PageRenderer};
use crate::domain::image::{Dimension, OutputFormat};
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::preview::{
    require_non_empty, validate_quality, BatchPreviewRequest, PreviewBatch, PreviewRequest,
};
use crate::infrastructure::byte_encoder::ResizingByteEncoder;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::external_image_fetcher::DefaultExternalImageFetcher;
use crate::infrastructure::image_processor::DefaultImageProcessor;
use crate::infrastructure::renderer_adapter::RendererAdapter;

/// Web page preview generator.
///
/// Renders a page (falling back to the external snapshot service), converts
/// and re-encodes it, scales it to the requested sizes and uploads the result.
/// No per-request state is stored here, so one instance can serve concurrent
/// callers.
pub struct PreviewGenerator {
    resolver: FallbackResolver,
    image_processor: Arc<dyn ImageProcessor + Send + Sync>,
    upload_stage: UploadStage,
    bootstrap: Dimension,
}

impl PreviewGenerator {
    pub fn new(
        resolver: FallbackResolver,
        image_processor: Arc<dyn ImageProcessor + Send + Sync>,
        upload_stage: UploadStage,
        bootstrap: Dimension,
    ) -> Self {
        Self {
            resolver,
            image_processor,
            upload_stage,
            bootstrap,
        }
    }

    // 既定の実装 (HTTP フェッチャー、画像処理、リサイズエンコーダー) で組み立てる
    pub fn from_config(
        config: &GeneratorConfig,
        renderer: Arc<dyn PageRenderer + Send + Sync>,
        storage: Arc<dyn FileStorage + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        config.validate()?;
        let fetcher = Arc::new(DefaultExternalImageFetcher::new(config.fetch_timeout()));
        let resolver = FallbackResolver::new(
            RendererAdapter::new(renderer),
            fetcher,
            config.snapshot_endpoint.clone(),
        );
        let image_processor = Arc::new(DefaultImageProcessor::new(config.staging_area()));
        let upload_stage = UploadStage::new(storage, Arc::new(ResizingByteEncoder::new()), config.create_folders);
        Ok(Self::new(resolver, image_processor, upload_stage, config.bootstrap_dimension()?))
    }

    pub fn generate_previews(
        &self,
        url: &str,
        dimensions: &[Dimension],
        is_jpg: bool,
        quality: f32,
    ) -> Result<PreviewBatch, ApplicationError> {
        require_non_empty("url", url)?;
        validate_quality(quality)?;

        // 最初の取得は要求サイズに関係なく固定サイズ
        let page = self
            .resolver
            .resolve(url, self.bootstrap.width(), self.bootstrap.height())?;
        let start = Instant::now();
        let format = page.output_format(is_jpg);
        let used_fallback = page.used_fallback;

        let mut image = page.image;
        if format.is_jpg() {
            // PNG → JPG
            image = self.image_processor.to_opaque_rgb(&image);
        }
        if quality < 1.0 {
            image = self.image_processor.reencode_at_quality(&image, quality, format)?;
        }
        let images = self.image_processor.scale_all(&image, dimensions, format)?;

        log::info!("Got images in {} ms: {}", start.elapsed().as_millis(), url);
        Ok(PreviewBatch {
            images,
            format,
            used_fallback,
        })
    }

    pub fn generate_preview(&self, request: &PreviewRequest) -> bool {
        match self.try_generate_preview(request) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Preview of {} was not generated: {}", request.url, e);
                false
            }
        }
    }

    pub fn try_generate_preview(&self, request: &PreviewRequest) -> Result<(), ApplicationError> {
        let dimension = request.validate()?;
        let options = request.options;

        let (stream, format, used_fallback) =
            self.image_stream(&request.url, dimension, options.make_jpg, options.quality)?;
        let file_name = format.file_name(&request.file_name);

        if used_fallback || !options.encode {
            // 外部サービスの画像は再エンコードしない
            return self
                .upload_stage
                .try_upload(&request.upload_directory, &file_name, format.mime_type(), stream);
        }
        self.upload_stage.try_encode_and_upload(
            &request.upload_directory,
            &file_name,
            format.mime_type(),
            stream,
            dimension.width(),
            dimension.height(),
        )
    }

    /// Generates previews for every URL in the batch, one after another.
    /// Returns `true` only when every entry succeeded.
    pub fn generate_preview_batch(&self, request: &BatchPreviewRequest) -> bool {
        match self.try_generate_preview_batch(request) {
            Ok(results) => results.iter().all(|ok| *ok),
            Err(e) => {
                log::error!("Batch preview rejected: {}", e);
                false
            }
        }
    }

    // 途中で失敗しても残りは続行し、URL ごとの結果を返す
    pub fn try_generate_preview_batch(&self, request: &BatchPreviewRequest) -> Result<Vec<bool>, ApplicationError> {
        request.validate()?;
        Ok(request
            .requests()
            .map(|single| self.generate_preview(&single))
            .collect())
    }

    pub fn scaled_image(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        is_jpg: bool,
    ) -> Result<DynamicImage, ApplicationError> {
        let dimension = Dimension::new(width, height)?;
        Ok(self
            .image_processor
            .scale_one(image, dimension, OutputFormat::from_jpg_flag(is_jpg))?)
    }

    pub fn scaled_image_from_bytes(
        &self,
        mut stream: impl Read,
        width: u32,
        height: u32,
        is_jpg: bool,
    ) -> Result<DynamicImage, ApplicationError> {
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).map_err(InfrastructureError::from)?;
        drop(stream);
        let image = image::load_from_memory(&raw).map_err(InfrastructureError::from)?;
        self.scaled_image(&image, width, height, is_jpg)
    }

    fn image_stream(
        &self,
        url: &str,
        dimension: Dimension,
        make_jpg: bool,
        quality: f32,
    ) -> Result<(Box<dyn Read + Send>, OutputFormat, bool), ApplicationError> {
        let start = Instant::now();
        let batch = self.generate_previews(url, &[dimension], make_jpg, quality)?;
        let image = batch
            .images
            .into_iter()
            .next()
            .ok_or_else(|| ApplicationError::PreviewGenerationFailed(format!("no image produced for {}", url)))?;
        let stream = self.image_processor.to_stream(&image, batch.format)?;
        log::info!("Got image stream in {} ms: {}", start.elapsed().as_millis(), url);
        Ok((stream, batch.format, batch.used_fallback))
    }
}
