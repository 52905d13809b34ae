pub mod collaborator_traits;
pub mod error;
pub mod image;
pub mod image_processor_trait;
pub mod preview;
pub mod scaling;
pub mod upload_request;
