use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use base64::Engine;
use image::{DynamicImage, ImageReader};

use crate::error::{NewsboothError, Result};

/// Resolves logical asset paths (e.g. `"newspaper-template.png"`) to decoded images.
///
/// Implementations must be `Sync` so the three loads of one composition can run in parallel.
pub trait AssetLoader: Sync {
    fn load(&self, path: &str) -> Result<DynamicImage>;
}

/// Loads assets from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirAssetLoader {
    root: PathBuf,
}

impl DirAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `path` onto the root, refusing absolute paths and `..` segments.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(NewsboothError::InvalidInput(format!(
                "asset path {path:?} must stay inside {}",
                self.root.display()
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl AssetLoader for DirAssetLoader {
    fn load(&self, path: &str) -> Result<DynamicImage> {
        let full = self.resolve(path)?;
        decode_file(&full)
    }
}

/// In-memory asset table, keyed by logical path. Handy for embedding templates and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLoader {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.assets.insert(path.into(), bytes);
        self
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load(&self, path: &str) -> Result<DynamicImage> {
        let bytes = self
            .assets
            .get(path)
            .ok_or_else(|| NewsboothError::InvalidInput(format!("unknown asset {path:?}")))?;
        decode_bytes(bytes)
    }
}

/// Where a source image comes from.
#[derive(Clone)]
pub enum ImageSource {
    /// Encoded image file on disk.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` URL, as produced by a browser capture.
    DataUrl(String),
    /// Logical path resolved through the compositor's `AssetLoader`.
    Asset(String),
    /// Already-decoded image.
    Image(DynamicImage),
}

impl ImageSource {
    /// Decode the source. Already-decoded images are borrowed, not copied.
    pub fn load<'a>(&'a self, loader: &dyn AssetLoader) -> Result<Cow<'a, DynamicImage>> {
        match self {
            ImageSource::Path(p) => decode_file(p).map(Cow::Owned),
            ImageSource::Bytes(b) => decode_bytes(b).map(Cow::Owned),
            ImageSource::DataUrl(url) => {
                let bytes = decode_data_url(url)?;
                decode_bytes(&bytes).map(Cow::Owned)
            }
            ImageSource::Asset(path) => loader.load(path).map(Cow::Owned),
            ImageSource::Image(img) => Ok(Cow::Borrowed(img)),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => write!(f, "Path({})", p.display()),
            ImageSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ImageSource::DataUrl(u) => {
                let head: String = u.chars().take(32).collect();
                write!(f, "DataUrl({head}...; {} chars)", u.len())
            }
            ImageSource::Asset(a) => write!(f, "Asset({a})"),
            ImageSource::Image(img) => write!(f, "Image({}x{})", img.width(), img.height()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(b: Vec<u8>) -> Self {
        ImageSource::Bytes(b)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        ImageSource::Image(img)
    }
}

pub fn decode_file(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(img)
}

/// Extract the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| NewsboothError::InvalidInput("not a data: URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| NewsboothError::InvalidInput("data: URL has no payload".into()))?;
    if !header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(NewsboothError::InvalidInput(
            "only base64 data: URLs are supported".into(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| NewsboothError::InvalidInput(format!("bad base64 payload: {e}")))
}
