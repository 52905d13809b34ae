use std::fmt;
use std::io::Read;

// ストレージへ渡す直前に組み立てる。content は所有権ごと渡すので、
// どの経路でも drop された時点で一度だけ閉じられる
pub struct UploadRequest {
    directory: String,
    file_name: String,
    mime_type: String,
    content: Box<dyn Read + Send>,
}

impl UploadRequest {
    pub fn new(
        directory: &str,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: Box<dyn Read + Send>,
    ) -> Self {
        Self {
            directory: normalize_directory(directory),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn into_content(self) -> Box<dyn Read + Send> {
        self.content
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("directory", &self.directory)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Makes `directory` start and end with `/`.
pub fn normalize_directory(directory: &str) -> String {
    let mut normalized = String::with_capacity(directory.len() + 2);
    if !directory.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(directory);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
