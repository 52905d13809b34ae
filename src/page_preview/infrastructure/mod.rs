pub mod byte_encoder;
pub mod error;
pub mod external_image_fetcher;
pub mod file_storage;
pub mod image_processor;
pub mod renderer_adapter;
pub mod staging;
