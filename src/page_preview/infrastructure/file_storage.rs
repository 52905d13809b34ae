use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::InfrastructureError;
use crate::domain::collaborator_traits::FileStorage;
use crate::domain::upload_request::UploadRequest;

// ルートディレクトリ配下に保存するストレージ実装 (開発・テスト用)
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve_directory(&self, directory: &str) -> PathBuf {
        self.root.join(directory.trim_matches('/'))
    }

    pub fn read_file(&self, directory: &str, file_name: &str) -> Result<Vec<u8>, InfrastructureError> {
        check_file_name(file_name)?;
        let data = fs::read(self.resolve_directory(directory).join(file_name))?;
        Ok(data)
    }
}

fn check_file_name(file_name: &str) -> Result<(), InfrastructureError> {
    if file_name.is_empty() || file_name.contains(|c: char| c == '/' || c == '\\') || file_name == ".." || file_name == "." {
        return Err(InfrastructureError::FileStorageError(format!(
            "invalid file name: {:?}",
            file_name
        )));
    }
    Ok(())
}

fn write_file(path: &Path, content: &mut dyn io::Read) -> Result<u64, InfrastructureError> {
    let mut file = BufWriter::new(File::create(path)?);
    let written = io::copy(content, &mut file)?;
    file.flush()?;
    Ok(written)
}

impl FileStorage for LocalFileStorage {
    fn upload(&self, request: UploadRequest, create_folders: bool) -> Result<bool, InfrastructureError> {
        check_file_name(request.file_name())?;
        if request.directory().split('/').any(|part| part == "..") {
            return Err(InfrastructureError::FileStorageError(format!(
                "invalid directory: {}",
                request.directory()
            )));
        }

        let directory = self.resolve_directory(request.directory());
        if !directory.is_dir() {
            if !create_folders {
                log::warn!("Upload directory does not exist: {}", directory.display());
                return Ok(false);
            }
            fs::create_dir_all(&directory)?;
        }

        let path = directory.join(request.file_name());
        let mut content = request.into_content();
        let written = write_file(&path, &mut content)?;
        log::info!("Stored {} bytes at {}", written, path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn request(directory: &str, file_name: &str, data: &[u8]) -> UploadRequest {
        UploadRequest::new(directory, file_name, "image/png", Box::new(Cursor::new(data.to_vec())))
    }

    #[test]
    fn test_upload_creates_folders_and_writes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = LocalFileStorage::new(dir.path());

        let stored = storage.upload(request("/previews/site", "home.png", b"png-bytes"), true).unwrap();
        assert!(stored);
        assert_eq!(storage.read_file("/previews/site/", "home.png").unwrap(), b"png-bytes");
        assert!(dir.path().join("previews/site/home.png").is_file());
    }

    #[test]
    fn test_upload_refuses_missing_folder_without_create() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = LocalFileStorage::new(dir.path());

        let stored = storage.upload(request("missing", "home.png", b"x"), false).unwrap();
        assert!(!stored);
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_upload_rejects_path_in_file_name() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = LocalFileStorage::new(dir.path());

        let result = storage.upload(request("previews", "../escape.png", b"x"), true);
        assert!(matches!(result, Err(InfrastructureError::FileStorageError(_))));
        let result = storage.upload(request("../outside", "ok.png", b"x"), true);
        assert!(matches!(result, Err(InfrastructureError::FileStorageError(_))));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = LocalFileStorage::new(dir.path());
        assert!(matches!(
            storage.read_file("previews", "nothing.png"),
            Err(InfrastructureError::IoError(_))
        ));
    }
}
