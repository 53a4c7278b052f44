use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::Rect;

/// Encoded output formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG, best compression with adaptive filtering.
    Png,
    /// Baseline JPEG at quality 100 (the canvas is always opaque).
    #[serde(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

/// Resampling filter used when scaling photos into their rectangles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    #[serde(alias = "bilinear")]
    Triangle,
    #[serde(alias = "catmull_rom", alias = "bicubic")]
    CatmullRom,
    Gaussian,
    #[serde(alias = "lanczos")]
    Lanczos3,
}

impl ResampleFilter {
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "bilinear" => Ok(Self::Triangle),
            "catmullrom" | "catmull_rom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(()),
        }
    }
}

/// Random-dot film grain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GrainConfig {
    /// Number of 1x1 dots plotted over the whole canvas.
    pub count: u32,
    /// Opacity of each black dot, 0.0..=1.0.
    pub alpha: f32,
    /// Fixed seed for reproducible grain. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            alpha: 0.08,
            seed: None,
        }
    }
}

/// Radial darkening from the canvas midpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VignetteConfig {
    /// Black opacity reached at the gradient radius (and beyond), 0.0..=1.0.
    pub alpha: f32,
    /// Gradient radius is `canvas_width / radius_divisor`.
    pub radius_divisor: f32,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            radius_divisor: 1.2,
        }
    }
}

/// Compositor configuration.
/// Key notes:
///   - canvas size and the two photo rectangles are fixed per template; the defaults match
///     a 2550x3300 portrait newspaper page
///   - `grain.seed` is `None` by default, so every composition gets a fresh grain pattern
///   - `template` is a logical path handed to the `AssetLoader`
///   - missing fields take their defaults; unknown fields are rejected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    /// Output canvas width in pixels.
    pub canvas_width: u32,
    /// Output canvas height in pixels.
    pub canvas_height: u32,
    /// Logical path of the newspaper template, resolved by the asset loader.
    pub template: String,
    /// Region filled by the first photo.
    pub primary: Rect,
    /// Region filled by the second photo.
    pub secondary: Rect,
    /// Opaque fill laid down before the template.
    pub paper_color: [u8; 3],
    pub resample: ResampleFilter,
    pub grain: GrainConfig,
    pub vignette: VignetteConfig,
    pub output_format: OutputFormat,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 2550,
            canvas_height: 3300,
            template: default_template(),
            primary: Rect::new(200, 200, 2100, 1400),
            secondary: Rect::new(200, 1700, 2100, 1200),
            paper_color: default_paper_color(),
            resample: default_resample(),
            grain: GrainConfig::default(),
            vignette: VignetteConfig::default(),
            output_format: default_output_format(),
        }
    }
}

impl CompositorConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The canvas has a zero dimension
    /// - Either photo rectangle is empty or extends past the canvas
    /// - An effect opacity is outside `0.0..=1.0`, or the vignette divisor is not positive
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::NewsboothError;

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(NewsboothError::InvalidDimensions {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        for (name, r) in [("primary", &self.primary), ("secondary", &self.secondary)] {
            if r.is_empty() {
                return Err(NewsboothError::InvalidConfig(format!(
                    "{name} rectangle is empty ({}x{})",
                    r.w, r.h
                )));
            }
            if !r.fits_within(self.canvas_width, self.canvas_height) {
                return Err(NewsboothError::InvalidConfig(format!(
                    "{name} rectangle {},{} {}x{} exceeds canvas {}x{}",
                    r.x, r.y, r.w, r.h, self.canvas_width, self.canvas_height
                )));
            }
        }

        if self.template.trim().is_empty() {
            return Err(NewsboothError::InvalidConfig(
                "template path is empty".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.grain.alpha) {
            return Err(NewsboothError::InvalidConfig(format!(
                "grain.alpha ({}) must be within 0..=1",
                self.grain.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.vignette.alpha) {
            return Err(NewsboothError::InvalidConfig(format!(
                "vignette.alpha ({}) must be within 0..=1",
                self.vignette.alpha
            )));
        }
        if !self.vignette.radius_divisor.is_finite() || self.vignette.radius_divisor <= 0.0 {
            return Err(NewsboothError::InvalidConfig(format!(
                "vignette.radius_divisor ({}) must be positive",
                self.vignette.radius_divisor
            )));
        }

        // Overlapping rectangles are allowed: the secondary photo simply draws on top.

        Ok(())
    }

    /// Full-canvas rectangle the template is stretched into.
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0, 0, self.canvas_width, self.canvas_height)
    }

    /// Create a fluent builder for `CompositorConfig`.
    pub fn builder() -> CompositorConfigBuilder {
        CompositorConfigBuilder::new()
    }
}

fn default_template() -> String {
    "newspaper-template.png".into()
}
fn default_paper_color() -> [u8; 3] {
    [255, 255, 255]
}
fn default_resample() -> ResampleFilter {
    ResampleFilter::Triangle
}
fn default_output_format() -> OutputFormat {
    OutputFormat::Png
}

/// Builder for `CompositorConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct CompositorConfigBuilder {
    cfg: CompositorConfig,
}

impl CompositorConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CompositorConfig::default(),
        }
    }
    pub fn with_canvas(mut self, w: u32, h: u32) -> Self {
        self.cfg.canvas_width = w;
        self.cfg.canvas_height = h;
        self
    }
    pub fn template(mut self, v: impl Into<String>) -> Self {
        self.cfg.template = v.into();
        self
    }
    pub fn primary(mut self, v: Rect) -> Self {
        self.cfg.primary = v;
        self
    }
    pub fn secondary(mut self, v: Rect) -> Self {
        self.cfg.secondary = v;
        self
    }
    pub fn paper_color(mut self, v: [u8; 3]) -> Self {
        self.cfg.paper_color = v;
        self
    }
    pub fn resample(mut self, v: ResampleFilter) -> Self {
        self.cfg.resample = v;
        self
    }
    pub fn grain_count(mut self, v: u32) -> Self {
        self.cfg.grain.count = v;
        self
    }
    pub fn grain_alpha(mut self, v: f32) -> Self {
        self.cfg.grain.alpha = v;
        self
    }
    pub fn grain_seed(mut self, v: Option<u64>) -> Self {
        self.cfg.grain.seed = v;
        self
    }
    pub fn vignette_alpha(mut self, v: f32) -> Self {
        self.cfg.vignette.alpha = v;
        self
    }
    pub fn vignette_radius_divisor(mut self, v: f32) -> Self {
        self.cfg.vignette.radius_divisor = v;
        self
    }
    pub fn output_format(mut self, v: OutputFormat) -> Self {
        self.cfg.output_format = v;
        self
    }
    pub fn build(self) -> CompositorConfig {
        self.cfg
    }
}
