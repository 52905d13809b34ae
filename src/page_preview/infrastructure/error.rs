use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    #[error("Image processing failed: {0}")]
    ImageProcessingError(String),

    #[error("File storage error: {0}")]
    FileStorageError(String),

    #[error("External API call failed: {0}")]
    ExternalApiError(String),

    #[error("Encoding failed: {0}")]
    EncodingError(String),

    #[error("Underlying image library error: {0}")]
    ImageLibError(#[from] image::ImageError),

    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}
