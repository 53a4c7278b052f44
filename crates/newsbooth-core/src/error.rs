use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three images a composition depends on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Newspaper template drawn as the full-canvas background.
    Background,
    /// Photo placed in the primary layout rectangle.
    Primary,
    /// Photo placed in the secondary layout rectangle.
    Secondary,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Asset::Background => "background template",
            Asset::Primary => "primary photo",
            Asset::Secondary => "secondary photo",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum NewsboothError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to load {asset}: {reason}")]
    AssetLoad { asset: Asset, reason: String },
    #[error("Cannot allocate a {width}x{height} drawing surface: {reason}")]
    Surface {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("Encoding error: {0}")]
    Encode(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Rejected upload: {0}")]
    Upload(String),
}

impl NewsboothError {
    /// Which asset failed to load, if this is a load failure.
    pub fn failed_asset(&self) -> Option<Asset> {
        match self {
            NewsboothError::AssetLoad { asset, .. } => Some(*asset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsboothError>;
