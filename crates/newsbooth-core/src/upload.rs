use std::fs;
use std::path::Path;

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::{NewsboothError, Result};
use crate::source::ImageSource;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Gatekeeper for user-supplied photos before they reach the compositor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Check size and sniff the format from magic bytes.
    pub fn check(&self, bytes: &[u8]) -> Result<ImageFormat> {
        if bytes.is_empty() {
            return Err(NewsboothError::Upload("file is empty".into()));
        }
        self.check_size(bytes.len() as u64)?;
        let format = image::guess_format(bytes)
            .map_err(|_| NewsboothError::Upload("file is not a recognized image".into()))?;
        if !format.reading_enabled() {
            return Err(NewsboothError::Upload(format!(
                "{format:?} images are not supported"
            )));
        }
        Ok(format)
    }

    /// Validate a file on disk and hand it back as an `ImageSource`.
    /// Oversize files are rejected from metadata, before being read.
    pub fn accept_file(&self, path: &Path) -> Result<ImageSource> {
        let len = fs::metadata(path)?.len();
        self.check_size(len)?;
        let bytes = fs::read(path)?;
        self.check(&bytes)?;
        Ok(ImageSource::Bytes(bytes))
    }

    fn check_size(&self, len: u64) -> Result<()> {
        if len > self.max_bytes {
            return Err(NewsboothError::Upload(format!(
                "file is {len} bytes, limit is {}",
                self.max_bytes
            )));
        }
        Ok(())
    }
}
