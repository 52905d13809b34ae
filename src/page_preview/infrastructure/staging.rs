//! Scoped staging for encoded image bytes.
//!
//! Encoded data either stays in memory or goes through a uniquely named
//! temporary file inside a scratch directory. Temporary files are removed when
//! the handle is dropped, so every exit path (including errors) cleans up.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat, ImageResult};

use super::error::InfrastructureError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StagingArea {
    #[default]
    Memory,
    Disk(PathBuf),
}

impl StagingArea {
    pub fn from_scratch_dir(scratch_dir: Option<PathBuf>) -> Self {
        match scratch_dir {
            Some(dir) => StagingArea::Disk(dir),
            None => StagingArea::Memory,
        }
    }

    /// Encodes with `write` and decodes the result back as `format`.
    pub fn round_trip<F>(&self, format: ImageFormat, write: F) -> Result<DynamicImage, InfrastructureError>
    where
        F: FnOnce(&mut dyn Write) -> ImageResult<()>,
    {
        match self {
            StagingArea::Memory => {
                let mut buffer = Vec::new();
                write(&mut buffer)?;
                Ok(image::load_from_memory_with_format(&buffer, format)?)
            }
            StagingArea::Disk(dir) => {
                let suffix = format!(".{}", format.extensions_str()[0]);
                let mut file = tempfile::Builder::new()
                    .prefix("preview-quality-")
                    .suffix(&suffix)
                    .tempfile_in(dir)?;
                {
                    let mut writer = BufWriter::new(file.as_file_mut());
                    write(&mut writer)?;
                    writer.flush()?;
                }
                let reader = BufReader::new(file.reopen()?);
                let decoded = image::io::Reader::with_format(reader, format).decode()?;
                log::debug!("Round-tripped image through {}", file.path().display());
                Ok(decoded)
                // file はここで drop され削除される
            }
        }
    }

    /// Encodes with `write` and hands back a readable stream over the bytes.
    pub fn into_stream<F>(&self, write: F) -> Result<Box<dyn Read + Send>, InfrastructureError>
    where
        F: FnOnce(&mut dyn Write) -> ImageResult<()>,
    {
        match self {
            StagingArea::Memory => {
                let mut buffer = Vec::new();
                write(&mut buffer)?;
                Ok(Box::new(Cursor::new(buffer)))
            }
            StagingArea::Disk(dir) => {
                // 名前なし一時ファイル: ストリームを閉じた時点で消える
                let mut file: File = tempfile::tempfile_in(dir)?;
                {
                    let mut writer = BufWriter::new(&mut file);
                    write(&mut writer)?;
                    writer.flush()?;
                }
                file.seek(SeekFrom::Start(0))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}
