//! Vintage print effects applied to the composite canvas.
//!
//! - `desaturate_region`: luminance grayscale (0.299/0.587/0.114) restricted to one rectangle
//! - `apply_grain`: sparse black dots at random positions, source-over
//! - `apply_vignette`: radial black gradient from the midpoint, multiply blend

use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::config::{GrainConfig, VignetteConfig};
use crate::model::Rect;

/// Vignette tint. Multiplying by black only ever darkens.
const VIGNETTE_COLOR: [u8; 3] = [0, 0, 0];

/// Perceptual luminance: `round(0.299 R + 0.587 G + 0.114 B)`.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Replace every pixel inside `rect` with its luminance gray. Alpha is untouched.
/// The part of `rect` that falls outside the canvas is ignored.
pub fn desaturate_region(canvas: &mut RgbaImage, rect: Rect) {
    let (cw, ch) = canvas.dimensions();
    let x_end = rect.right().min(cw as u64) as u32;
    let y_end = rect.bottom().min(ch as u64) as u32;
    for y in rect.y.min(ch)..y_end {
        for x in rect.x.min(cw)..x_end {
            let px = canvas.get_pixel_mut(x, y);
            let g = luminance(px[0], px[1], px[2]);
            px[0] = g;
            px[1] = g;
            px[2] = g;
        }
    }
}

/// Plot `grain.count` single black pixels at uniformly random canvas positions,
/// each at `grain.alpha` opacity. Dots may land on the same pixel more than once.
pub fn apply_grain<R: Rng>(canvas: &mut RgbaImage, grain: &GrainConfig, rng: &mut R) {
    let (cw, ch) = canvas.dimensions();
    if cw == 0 || ch == 0 || grain.alpha <= 0.0 {
        return;
    }
    for _ in 0..grain.count {
        let x = rng.gen_range(0..cw);
        let y = rng.gen_range(0..ch);
        over_black(canvas.get_pixel_mut(x, y), grain.alpha);
    }
}

/// Darken toward the edges with a radial gradient centered on the canvas.
///
/// Opacity grows linearly from 0 at the midpoint to `vignette.alpha` at
/// `canvas_width / vignette.radius_divisor` and stays there beyond it.
pub fn apply_vignette(canvas: &mut RgbaImage, vignette: &VignetteConfig) {
    let (cw, ch) = canvas.dimensions();
    if cw == 0 || ch == 0 || vignette.alpha <= 0.0 {
        return;
    }
    let cx = cw as f64 / 2.0;
    let cy = ch as f64 / 2.0;
    let radius = cw as f64 / vignette.radius_divisor as f64;
    let max_alpha = vignette.alpha as f64;
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        // sample at pixel centers
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        let t = ((dx * dx + dy * dy).sqrt() / radius).min(1.0);
        multiply(px, VIGNETTE_COLOR, t * max_alpha);
    }
}

#[inline]
fn over_black(px: &mut Rgba<u8>, alpha: f32) {
    let keep = 1.0 - alpha.clamp(0.0, 1.0);
    for c in 0..3 {
        px[c] = (px[c] as f32 * keep).round() as u8;
    }
}

/// Multiply blend of `color` at `alpha` over an opaque backdrop:
/// `out = (1 - a) * dst + a * dst * color`.
#[inline]
fn multiply(px: &mut Rgba<u8>, color: [u8; 3], alpha: f64) {
    if alpha <= 0.0 {
        return;
    }
    for c in 0..3 {
        let d = px[c] as f64;
        let m = d * color[c] as f64 / 255.0;
        px[c] = ((1.0 - alpha) * d + alpha * m).round().clamp(0.0, 255.0) as u8;
    }
}
