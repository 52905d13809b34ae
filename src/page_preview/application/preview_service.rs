use std::sync::Arc;

use super::error::ApplicationError;
use super::preview_generator::PreviewGenerator;
use crate::domain::image::Dimension;
use crate::domain::preview::{BatchPreviewRequest, PreviewBatch, PreviewRequest};

// 非同期ランタイムから使うためのラッパー
// 生成処理はブロッキングなので spawn_blocking で実行する
#[derive(Clone)]
pub struct PreviewService {
    generator: Arc<PreviewGenerator>,
}

impl PreviewService {
    pub fn new(generator: Arc<PreviewGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate_previews(
        &self,
        url: String,
        dimensions: Vec<Dimension>,
        is_jpg: bool,
        quality: f32,
    ) -> Result<PreviewBatch, ApplicationError> {
        log::debug!("PreviewService: generate_previews called for URL: {}", url);
        let generator = self.generator.clone();
        tokio::task::spawn_blocking(move || generator.generate_previews(&url, &dimensions, is_jpg, quality))
            .await
            .map_err(|e| ApplicationError::PreviewGenerationFailed(format!("preview task failed: {}", e)))?
    }

    pub async fn generate_preview(&self, request: PreviewRequest) -> bool {
        log::debug!("PreviewService: generate_preview called for URL: {}", request.url);
        let generator = self.generator.clone();
        match tokio::task::spawn_blocking(move || generator.generate_preview(&request)).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Preview task failed: {}", e);
                false
            }
        }
    }

    pub async fn generate_preview_batch(&self, request: BatchPreviewRequest) -> Result<Vec<bool>, ApplicationError> {
        let generator = self.generator.clone();
        tokio::task::spawn_blocking(move || generator.try_generate_preview_batch(&request))
            .await
            .map_err(|e| ApplicationError::PreviewGenerationFailed(format!("batch task failed: {}", e)))?
    }
}
