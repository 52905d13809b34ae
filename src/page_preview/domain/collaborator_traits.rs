use std::io::Read;

use image::DynamicImage;

use crate::domain::upload_request::UploadRequest;
use crate::infrastructure::error::InfrastructureError;

// 外部コンポーネントとの境界。実装はアプリ側から注入する

/// The page rendering engine. Any failure (including a panic) is treated as
/// recoverable by the renderer adapter.
#[cfg_attr(test, mockall::automock)]
pub trait PageRenderer {
    fn render(&self, url: &str, width: u32, height: u32) -> anyhow::Result<DynamicImage>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ImageFetcher {
    fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>, InfrastructureError>;
}

/// Remote file storage. `Ok(false)` means the service refused the file.
#[cfg_attr(test, mockall::automock)]
pub trait FileStorage {
    fn upload(
        &self,
        request: UploadRequest,
        create_folders: bool,
    ) -> Result<bool, InfrastructureError>;
}

// 生のバイト列を指定 mime type・サイズへ再エンコードする
#[cfg_attr(test, mockall::automock)]
pub trait ByteEncoder {
    fn encode(
        &self,
        mime_type: &str,
        source: Box<dyn Read + Send>,
        destination: &mut Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<(), InfrastructureError>;
}
