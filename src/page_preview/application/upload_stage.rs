use std::io::{Cursor, Read};
use std::sync::Arc;

use super::error::ApplicationError;
use crate::domain::collaborator_traits::{ByteEncoder, FileStorage};
use crate::domain::upload_request::{normalize_directory, UploadRequest};

// 再エンコードとストレージへのアップロードを担当する
// ストリームは所有権で受け取るため、どの経路でも関数を抜けるときに解放される
pub struct UploadStage {
    storage: Arc<dyn FileStorage + Send + Sync>,
    encoder: Arc<dyn ByteEncoder + Send + Sync>,
    create_folders: bool,
}

impl UploadStage {
    pub fn new(
        storage: Arc<dyn FileStorage + Send + Sync>,
        encoder: Arc<dyn ByteEncoder + Send + Sync>,
        create_folders: bool,
    ) -> Self {
        Self {
            storage,
            encoder,
            create_folders,
        }
    }

    pub fn encode_and_upload(
        &self,
        directory: &str,
        file_name: &str,
        mime_type: &str,
        source: Box<dyn Read + Send>,
        width: u32,
        height: u32,
    ) -> bool {
        match self.try_encode_and_upload(directory, file_name, mime_type, source, width, height) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Encode and upload of {} failed: {}", file_name, e);
                false
            }
        }
    }

    pub fn try_encode_and_upload(
        &self,
        directory: &str,
        file_name: &str,
        mime_type: &str,
        source: Box<dyn Read + Send>,
        width: u32,
        height: u32,
    ) -> Result<(), ApplicationError> {
        let mut encoded = Vec::new();
        self.encoder.encode(mime_type, source, &mut encoded, width, height)?;
        log::debug!("Encoded {} into {} bytes ({})", file_name, encoded.len(), mime_type);
        self.try_upload(directory, file_name, mime_type, Box::new(Cursor::new(encoded)))
    }

    pub fn upload(&self, directory: &str, file_name: &str, mime_type: &str, stream: Box<dyn Read + Send>) -> bool {
        match self.try_upload(directory, file_name, mime_type, stream) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error uploading file {}: {}", file_name, e);
                false
            }
        }
    }

    pub fn try_upload(
        &self,
        directory: &str,
        file_name: &str,
        mime_type: &str,
        stream: Box<dyn Read + Send>,
    ) -> Result<(), ApplicationError> {
        let request = UploadRequest::new(directory, file_name, mime_type, stream);
        if self.storage.upload(request, self.create_folders)? {
            Ok(())
        } else {
            Err(ApplicationError::UploadFailed(format!(
                "storage refused {}{}",
                normalize_directory(directory),
                file_name
            )))
        }
    }
}
