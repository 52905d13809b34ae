use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::error::ApplicationError;
use crate::domain::image::Dimension;
use crate::infrastructure::staging::StagingArea;

pub const DEFAULT_SNAPSHOT_ENDPOINT: &str = "http://webdesignbook.net/snapper.php";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub snapshot_endpoint: String,
    // 最初のレンダリングは常にこのサイズ。要求サイズへの縮小はその後
    pub bootstrap_width: u32,
    pub bootstrap_height: u32,
    pub fetch_timeout_ms: u64,
    // None ならメモリ上で処理する
    pub scratch_dir: Option<PathBuf>,
    pub create_folders: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            snapshot_endpoint: DEFAULT_SNAPSHOT_ENDPOINT.to_string(),
            bootstrap_width: 800,
            bootstrap_height: 600,
            fetch_timeout_ms: 30_000,
            scratch_dir: None,
            create_folders: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ApplicationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ApplicationError::ConfigurationError(format!("Failed to parse generator config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApplicationError::ConfigurationError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.snapshot_endpoint.is_empty() {
            return Err(ApplicationError::ConfigurationError(
                "snapshot_endpoint must not be empty".to_string(),
            ));
        }
        self.bootstrap_dimension()?;
        Ok(())
    }

    pub fn bootstrap_dimension(&self) -> Result<Dimension, ApplicationError> {
        Dimension::new(self.bootstrap_width, self.bootstrap_height)
            .map_err(|e| ApplicationError::ConfigurationError(format!("bootstrap size: {}", e)))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn staging_area(&self) -> StagingArea {
        StagingArea::from_scratch_dir(self.scratch_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.snapshot_endpoint, DEFAULT_SNAPSHOT_ENDPOINT);
        assert_eq!(config.bootstrap_dimension().unwrap(), Dimension::new(800, 600).unwrap());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.staging_area(), StagingArea::Memory);
        assert!(config.create_folders);
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = GeneratorConfig::from_json(
            r#"{ "bootstrap_width": 1024, "scratch_dir": "/tmp/previews", "create_folders": false }"#,
        )
        .unwrap();
        assert_eq!(config.bootstrap_width, 1024);
        assert_eq!(config.bootstrap_height, 600);
        assert_eq!(config.staging_area(), StagingArea::Disk(PathBuf::from("/tmp/previews")));
        assert!(!config.create_folders);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            GeneratorConfig::from_json("{ not json"),
            Err(ApplicationError::ConfigurationError(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "bootstrap_height": 0 }"#),
            Err(ApplicationError::ConfigurationError(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "snapshot_endpoint": "" }"#),
            Err(ApplicationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("preview.json");
        std::fs::write(&path, r#"{ "fetch_timeout_ms": 500 }"#).unwrap();
        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_millis(500));

        assert!(GeneratorConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
