use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;

use super::error::InfrastructureError;
use crate::domain::collaborator_traits::PageRenderer;

/// Wraps the page rendering engine so that every engine failure, panics
/// included, comes back as `InfrastructureError::RenderFailed`.
#[derive(Clone)]
pub struct RendererAdapter {
    engine: Arc<dyn PageRenderer + Send + Sync>,
}

impl RendererAdapter {
    pub fn new(engine: Arc<dyn PageRenderer + Send + Sync>) -> Self {
        Self { engine }
    }

    pub fn render(&self, url: &str, width: u32, height: u32) -> Result<DynamicImage, InfrastructureError> {
        let start = Instant::now();
        log::info!("Trying with page renderer: {}", url);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.engine.render(url, width, height)));
        match outcome {
            Ok(Ok(image)) => {
                log::info!(
                    "Page renderer: success in {} ms: {}",
                    start.elapsed().as_millis(),
                    url
                );
                Ok(image)
            }
            Ok(Err(e)) => {
                log::error!("Unable to generate image with page renderer: {}", url);
                log::trace!("{:?}", e);
                Err(InfrastructureError::RenderFailed(format!("{}: {:#}", url, e)))
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Page renderer panicked on {}: {}", url, reason);
                Err(InfrastructureError::RenderFailed(format!("{}: renderer panicked: {}", url, reason)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborator_traits::MockPageRenderer;
    use image::RgbaImage;
    use mockall::predicate::eq;

    struct PanickingRenderer;

    impl PageRenderer for PanickingRenderer {
        fn render(&self, _url: &str, _width: u32, _height: u32) -> anyhow::Result<DynamicImage> {
            panic!("layout engine crashed");
        }
    }

    #[test]
    fn test_render_success_passes_through() {
        let mut engine = MockPageRenderer::new();
        engine
            .expect_render()
            .with(eq("http://example.com"), eq(800), eq(600))
            .times(1)
            .returning(|_, w, h| Ok(DynamicImage::ImageRgba8(RgbaImage::new(w, h))));

        let adapter = RendererAdapter::new(Arc::new(engine));
        let image = adapter.render("http://example.com", 800, 600).unwrap();
        assert_eq!((image.width(), image.height()), (800, 600));
    }

    #[test]
    fn test_render_error_is_reported() {
        let mut engine = MockPageRenderer::new();
        engine
            .expect_render()
            .returning(|_, _, _| Err(anyhow::anyhow!("unsupported markup")));

        let adapter = RendererAdapter::new(Arc::new(engine));
        match adapter.render("http://example.com", 800, 600) {
            Err(InfrastructureError::RenderFailed(msg)) => assert!(msg.contains("unsupported markup")),
            other => panic!("Expected RenderFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_render_panic_is_contained() {
        let adapter = RendererAdapter::new(Arc::new(PanickingRenderer));
        match adapter.render("http://example.com", 800, 600) {
            Err(InfrastructureError::RenderFailed(msg)) => assert!(msg.contains("layout engine crashed")),
            other => panic!("Expected RenderFailed, got {:?}", other.map(|_| ())),
        }
    }
}
