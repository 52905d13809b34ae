//! Web page preview generation.
//!
//! A page is rendered by an injected [`PageRenderer`]; if that fails the
//! external snapshot service is asked for an image instead. The result is
//! converted, optionally re-encoded at a lower quality, scaled to every
//! requested size and uploaded through an injected [`FileStorage`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_preview::{GeneratorConfig, LocalFileStorage, PageRenderer, PreviewGenerator, PreviewOptions, PreviewRequest};
//!
//! struct Engine;
//!
//! impl PageRenderer for Engine {
//!     fn render(&self, url: &str, _width: u32, _height: u32) -> anyhow::Result<image::DynamicImage> {
//!         anyhow::bail!("no engine available for {}", url)
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = PreviewGenerator::from_config(
//!     &GeneratorConfig::default(),
//!     Arc::new(Engine),
//!     Arc::new(LocalFileStorage::new("/var/previews")),
//! )?;
//! let request = PreviewRequest::new("http://example.com", "home", "/previews", 200, 150, PreviewOptions::default());
//! let stored = generator.generate_preview(&request);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::config::GeneratorConfig;
pub use application::error::ApplicationError;
pub use application::fallback_resolver::FallbackResolver;
pub use application::preview_generator::PreviewGenerator;
pub use application::preview_service::PreviewService;
pub use application::upload_stage::UploadStage;
pub use domain::collaborator_traits::{ByteEncoder, FileStorage, ImageFetcher, PageRenderer};
pub use domain::error::DomainError;
pub use domain::image::{Dimension, OutputFormat};
pub use domain::image_processor_trait::ImageProcessor;
pub use domain::preview::{BatchPreviewRequest, PreviewBatch, PreviewOptions, PreviewRequest, RenderedPage};
pub use domain::upload_request::UploadRequest;
pub use infrastructure::error::InfrastructureError;
pub use infrastructure::file_storage::LocalFileStorage;
