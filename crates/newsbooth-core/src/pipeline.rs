use std::borrow::Cow;

use image::{DynamicImage, GenericImageView, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, instrument, trace};

use crate::compositing::{allocate_canvas, draw_cover, draw_stretched};
use crate::config::CompositorConfig;
use crate::effects::{apply_grain, apply_vignette, desaturate_region};
use crate::encode::{Artifact, encode};
use crate::error::{Asset, NewsboothError, Result};
use crate::source::{AssetLoader, DirAssetLoader, ImageSource};

/// One composition job: the two captured photos plus the edition date.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub primary: ImageSource,
    pub secondary: ImageSource,
    /// Pre-formatted edition date. Carried through and logged; the layout has
    /// no text slot, so it is not drawn.
    pub date: String,
}

impl ComposeRequest {
    pub fn new(
        primary: impl Into<ImageSource>,
        secondary: impl Into<ImageSource>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            date: date.into(),
        }
    }
}

/// Validated configuration bound to an asset loader.
///
/// Holds no per-call state: every `compose` owns its own canvas, so one
/// `Compositor` can serve any number of sequential or concurrent calls.
pub struct Compositor<L = DirAssetLoader> {
    config: CompositorConfig,
    loader: L,
}

impl<L: AssetLoader> Compositor<L> {
    pub fn new(config: CompositorConfig, loader: L) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Compose and encode in the configured output format.
    pub fn compose(&self, request: &ComposeRequest) -> Result<Artifact> {
        let canvas = run(request, &self.config, &self.loader)?;
        encode(&canvas, self.config.output_format)
    }

    /// Compose without encoding.
    pub fn compose_canvas(&self, request: &ComposeRequest) -> Result<RgbaImage> {
        run(request, &self.config, &self.loader)
    }
}

/// Composes `request` onto the newspaper template and returns the encoded artifact.
///
/// Notes:
/// - The template and both photos are loaded first, concurrently under the default
///   `parallel` feature (sequentially without it);
///   any failure aborts with `NewsboothError::AssetLoad` naming the asset.
/// - Drawing order is fixed: template, photo 1, gray 1, photo 2, gray 2, grain, vignette.
/// - Grain is unseeded unless `config.grain.seed` is set.
pub fn compose_newspaper(
    request: &ComposeRequest,
    config: &CompositorConfig,
    loader: &dyn AssetLoader,
) -> Result<Artifact> {
    config.validate()?;
    let canvas = run(request, config, loader)?;
    encode(&canvas, config.output_format)
}

/// Like [`compose_newspaper`] but returns the finished canvas instead of encoding it.
pub fn compose_canvas(
    request: &ComposeRequest,
    config: &CompositorConfig,
    loader: &dyn AssetLoader,
) -> Result<RgbaImage> {
    config.validate()?;
    run(request, config, loader)
}

struct Loaded<'a> {
    background: Cow<'a, DynamicImage>,
    primary: Cow<'a, DynamicImage>,
    secondary: Cow<'a, DynamicImage>,
}

#[instrument(skip_all, fields(date = %request.date))]
fn run(
    request: &ComposeRequest,
    cfg: &CompositorConfig,
    loader: &dyn AssetLoader,
) -> Result<RgbaImage> {
    let template = ImageSource::Asset(cfg.template.clone());
    let images = load_all(&template, request, loader)?;
    debug!(
        background = ?images.background.dimensions(),
        primary = ?images.primary.dimensions(),
        secondary = ?images.secondary.dimensions(),
        "sources decoded"
    );

    let mut canvas = allocate_canvas(cfg.canvas_width, cfg.canvas_height, cfg.paper_color)?;

    draw_stretched(&images.background, &mut canvas, cfg.resample);
    trace!("background drawn");

    let crop = draw_cover(&images.primary, &mut canvas, cfg.primary, cfg.resample)?;
    trace!(source = ?crop.source, scale = crop.scale, "primary drawn");
    desaturate_region(&mut canvas, cfg.primary);

    let crop = draw_cover(&images.secondary, &mut canvas, cfg.secondary, cfg.resample)?;
    trace!(source = ?crop.source, scale = crop.scale, "secondary drawn");
    desaturate_region(&mut canvas, cfg.secondary);

    match cfg.grain.seed {
        Some(seed) => apply_grain(&mut canvas, &cfg.grain, &mut StdRng::seed_from_u64(seed)),
        None => apply_grain(&mut canvas, &cfg.grain, &mut rand::thread_rng()),
    }
    apply_vignette(&mut canvas, &cfg.vignette);

    debug!(
        width = canvas.width(),
        height = canvas.height(),
        "composite ready"
    );
    Ok(canvas)
}

fn load_one<'a>(
    asset: Asset,
    source: &'a ImageSource,
    loader: &dyn AssetLoader,
) -> Result<Cow<'a, DynamicImage>> {
    source
        .load(loader)
        .map_err(|e| NewsboothError::AssetLoad {
            asset,
            reason: e.to_string(),
        })
}

#[cfg(feature = "parallel")]
fn load_all<'a>(
    template: &'a ImageSource,
    request: &'a ComposeRequest,
    loader: &dyn AssetLoader,
) -> Result<Loaded<'a>> {
    let (background, (primary, secondary)) = rayon::join(
        || load_one(Asset::Background, template, loader),
        || {
            rayon::join(
                || load_one(Asset::Primary, &request.primary, loader),
                || load_one(Asset::Secondary, &request.secondary, loader),
            )
        },
    );
    Ok(Loaded {
        background: background?,
        primary: primary?,
        secondary: secondary?,
    })
}

#[cfg(not(feature = "parallel"))]
fn load_all<'a>(
    template: &'a ImageSource,
    request: &'a ComposeRequest,
    loader: &dyn AssetLoader,
) -> Result<Loaded<'a>> {
    Ok(Loaded {
        background: load_one(Asset::Background, template, loader)?,
        primary: load_one(Asset::Primary, &request.primary, loader)?,
        secondary: load_one(Asset::Secondary, &request.secondary, loader)?,
    })
}
