use std::sync::Arc;

use reqwest::Url;

use crate::domain::collaborator_traits::ImageFetcher;
use crate::domain::preview::RenderedPage;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::renderer_adapter::RendererAdapter;

// レンダラーが失敗したら外部のスナップショットサービスから画像を取る
pub struct FallbackResolver {
    renderer: RendererAdapter,
    fetcher: Arc<dyn ImageFetcher + Send + Sync>,
    snapshot_endpoint: String,
}

impl FallbackResolver {
    pub fn new(
        renderer: RendererAdapter,
        fetcher: Arc<dyn ImageFetcher + Send + Sync>,
        snapshot_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            snapshot_endpoint: snapshot_endpoint.into(),
        }
    }

    pub fn resolve(&self, url: &str, width: u32, height: u32) -> Result<RenderedPage, InfrastructureError> {
        let render_error = match self.renderer.render(url, width, height) {
            Ok(image) => return Ok(RenderedPage::from_renderer(image)),
            Err(e) => e,
        };
        log::warn!("{}; trying with external service", render_error);

        // ここで失敗したらそれ以上のフォールバックはない
        let snapshot_url = self.snapshot_url(url, width, height)?;
        let bytes = self.fetcher.fetch_image_bytes(snapshot_url.as_str())?;
        let image = image::load_from_memory(&bytes)?;
        log::info!("External service: success: {}", url);
        Ok(RenderedPage::from_snapshot_service(image))
    }

    /// `<endpoint>?url=<url>&w=<width>&h=<height>`
    pub fn snapshot_url(&self, url: &str, width: u32, height: u32) -> Result<Url, InfrastructureError> {
        let (width, height) = (width.to_string(), height.to_string());
        Url::parse_with_params(
            &self.snapshot_endpoint,
            &[("url", url), ("w", width.as_str()), ("h", height.as_str())],
        )
        .map_err(|e| {
            InfrastructureError::ExternalApiError(format!(
                "Invalid snapshot URL for {} ({}): {}",
                url, self.snapshot_endpoint, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborator_traits::{MockImageFetcher, MockPageRenderer};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
    use std::io::Cursor;

    const ENDPOINT: &str = "http://snapshots.test/snapper.php";

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 50, 60])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    fn failing_renderer() -> RendererAdapter {
        let mut engine = MockPageRenderer::new();
        engine
            .expect_render()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("renderer unavailable")));
        RendererAdapter::new(Arc::new(engine))
    }

    #[test]
    fn test_primary_success_skips_fetcher() {
        let mut engine = MockPageRenderer::new();
        engine
            .expect_render()
            .returning(|_, w, h| Ok(DynamicImage::ImageRgba8(RgbaImage::new(w, h))));
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch_image_bytes().times(0);

        let resolver = FallbackResolver::new(RendererAdapter::new(Arc::new(engine)), Arc::new(fetcher), ENDPOINT);
        let page = resolver.resolve("http://example.com", 800, 600).unwrap();
        assert!(!page.used_fallback);
        assert_eq!((page.image.width(), page.image.height()), (800, 600));
    }

    #[test]
    fn test_renderer_failure_uses_snapshot_service_with_same_arguments() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .withf(|requested: &str| {
                let parsed = Url::parse(requested).unwrap();
                let params: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
                requested.starts_with(ENDPOINT)
                    && params
                        == vec![
                            ("url".to_string(), "http://example.com/a?b=c".to_string()),
                            ("w".to_string(), "800".to_string()),
                            ("h".to_string(), "600".to_string()),
                        ]
            })
            .times(1)
            .returning(|_| Ok(jpeg_bytes(800, 600)));

        let resolver = FallbackResolver::new(failing_renderer(), Arc::new(fetcher), ENDPOINT);
        let page = resolver.resolve("http://example.com/a?b=c", 800, 600).unwrap();
        assert!(page.used_fallback);
        assert_eq!(page.output_format(false), crate::domain::image::OutputFormat::Jpg);
    }

    #[test]
    fn test_fetch_failure_is_terminal() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .times(1)
            .returning(|_| Err(InfrastructureError::ExternalApiError("503".to_string())));

        let resolver = FallbackResolver::new(failing_renderer(), Arc::new(fetcher), ENDPOINT);
        assert!(matches!(
            resolver.resolve("http://example.com", 800, 600),
            Err(InfrastructureError::ExternalApiError(_))
        ));
    }

    #[test]
    fn test_undecodable_snapshot_is_terminal() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .returning(|_| Ok(b"<html>not an image</html>".to_vec()));

        let resolver = FallbackResolver::new(failing_renderer(), Arc::new(fetcher), ENDPOINT);
        assert!(matches!(
            resolver.resolve("http://example.com", 800, 600),
            Err(InfrastructureError::ImageLibError(_))
        ));
    }

    #[test]
    fn test_malformed_endpoint_is_terminal() {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch_image_bytes().times(0);

        let resolver = FallbackResolver::new(failing_renderer(), Arc::new(fetcher), "not an endpoint");
        assert!(matches!(
            resolver.resolve("http://example.com", 800, 600),
            Err(InfrastructureError::ExternalApiError(_))
        ));
    }
}
