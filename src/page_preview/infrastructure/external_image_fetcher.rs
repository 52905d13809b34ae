use std::time::Duration;

use super::error::InfrastructureError;
use crate::domain::collaborator_traits::ImageFetcher;

pub struct DefaultExternalImageFetcher {
    timeout: Duration,
}

impl DefaultExternalImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for DefaultExternalImageFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ImageFetcher for DefaultExternalImageFetcher {
    fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>, InfrastructureError> {
        // ブロッキングクライアントは呼び出しごとに作る (非同期ランタイム上で drop させないため)
        let client = reqwest::blocking::Client::builder().timeout(self.timeout).build()?;
        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::ExternalApiError(format!(
                "{} returned {}",
                url, status
            )));
        }
        let bytes = response.bytes()?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
