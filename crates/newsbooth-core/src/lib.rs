//! Core library for the retro newspaper photobooth.
//!
//! - Compositor: `compose_newspaper` lays two photos onto a newspaper template
//! - Layout: the template is stretched to the canvas; each photo is cover-fitted into its rectangle
//! - Effects: luminance grayscale per photo rectangle, random-dot grain, radial vignette
//! - Output: PNG (default) or JPEG bytes, optionally as a `data:` URL
//!
//! Quick example:
//! ```ignore
//! use newsbooth_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let loader = DirAssetLoader::new("assets");
//! let compositor = Compositor::new(CompositorConfig::default(), loader)?;
//! let request = ComposeRequest::new(
//!     std::path::PathBuf::from("left.jpg"),
//!     std::path::PathBuf::from("right.jpg"),
//!     "Friday, October 16, 2026",
//! );
//! let artifact = compositor.compose(&request)?;
//! std::fs::write("front-page.png", &artifact.bytes)?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod effects;
pub mod encode;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod upload;

pub use compositing::*;
pub use config::*;
pub use effects::*;
pub use encode::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;
pub use source::*;
pub use upload::*;

/// Convenience prelude for common types and functions.
/// Importing `newsbooth_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        CompositorConfig, CompositorConfigBuilder, GrainConfig, OutputFormat, ResampleFilter,
        VignetteConfig,
    };
    pub use crate::encode::Artifact;
    pub use crate::error::{Asset, NewsboothError};
    pub use crate::model::{CoverCrop, Rect};
    pub use crate::source::{AssetLoader, DirAssetLoader, ImageSource, MemoryAssetLoader};
    pub use crate::upload::UploadPolicy;
    pub use crate::{ComposeRequest, Compositor, compose_canvas, compose_newspaper};
}
