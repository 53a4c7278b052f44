use image::{DynamicImage, Rgba, RgbaImage, imageops};

use crate::config::ResampleFilter;
use crate::error::{NewsboothError, Result};
use crate::model::{CoverCrop, Rect};

/// Allocate an opaque `width x height` canvas filled with `fill`.
///
/// Allocation is fallible: a surface that cannot be reserved is reported as
/// `NewsboothError::Surface` instead of aborting the process.
pub fn allocate_canvas(width: u32, height: u32, fill: [u8; 3]) -> Result<RgbaImage> {
    let surface_err = |reason: String| NewsboothError::Surface {
        width,
        height,
        reason,
    };
    if width == 0 || height == 0 {
        return Err(surface_err("zero-sized surface".into()));
    }
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| surface_err("pixel count overflows usize".into()))?;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| surface_err(e.to_string()))?;
    buf.resize(len, 0);
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&[fill[0], fill[1], fill[2], 255]);
    }
    RgbaImage::from_raw(width, height, buf)
        .ok_or_else(|| surface_err("buffer does not match dimensions".into()))
}

/// Composite `src` over `dst` with normal (source-over) blending.
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        *dst = src;
        return;
    }
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Stretch `src` to exactly fill `canvas`, ignoring its aspect ratio.
pub fn draw_stretched(src: &DynamicImage, canvas: &mut RgbaImage, filter: ResampleFilter) {
    let (cw, ch) = canvas.dimensions();
    let scaled = imageops::resize(src, cw, ch, filter.to_image_filter());
    for (dst, src_px) in canvas.pixels_mut().zip(scaled.pixels()) {
        blend_over(dst, *src_px);
    }
}

/// Pick the centered region of a `src_w x src_h` image that cover-fits `dest`.
///
/// A source relatively wider than `dest` is scaled to `dest.h` and loses its
/// left/right excess; a relatively taller one is scaled to `dest.w` and loses
/// top/bottom excess. Returns `None` when either side is empty.
pub fn cover_fit(src_w: u32, src_h: u32, dest: Rect) -> Option<CoverCrop> {
    if src_w == 0 || src_h == 0 || dest.is_empty() {
        return None;
    }
    let src_ratio = src_w as f64 / src_h as f64;
    let dst_ratio = dest.w as f64 / dest.h as f64;
    if src_ratio > dst_ratio {
        let scale = dest.h as f64 / src_h as f64;
        let visible_w = (dest.w as f64 / scale).round() as u32;
        let sw = visible_w.clamp(1, src_w);
        let sx = (src_w - sw) / 2;
        Some(CoverCrop {
            source: Rect::new(sx, 0, sw, src_h),
            scale,
        })
    } else {
        let scale = dest.w as f64 / src_w as f64;
        let visible_h = (dest.h as f64 / scale).round() as u32;
        let sh = visible_h.clamp(1, src_h);
        let sy = (src_h - sh) / 2;
        Some(CoverCrop {
            source: Rect::new(0, sy, src_w, sh),
            scale,
        })
    }
}

/// Cover-fit `src` into `dest` on `canvas`. Every pixel of `dest` that lies on
/// the canvas receives photo content; nothing outside `dest` is touched.
pub fn draw_cover(
    src: &DynamicImage,
    canvas: &mut RgbaImage,
    dest: Rect,
    filter: ResampleFilter,
) -> Result<CoverCrop> {
    let crop = cover_fit(src.width(), src.height(), dest).ok_or_else(|| {
        NewsboothError::InvalidInput(format!(
            "cannot cover-fit {}x{} image into {}x{} rectangle",
            src.width(),
            src.height(),
            dest.w,
            dest.h
        ))
    })?;
    let s = crop.source;
    let visible = imageops::crop_imm(src, s.x, s.y, s.w, s.h);
    let scaled = imageops::resize(&*visible, dest.w, dest.h, filter.to_image_filter());

    let (cw, ch) = canvas.dimensions();
    for (xx, yy, px) in scaled.enumerate_pixels() {
        // clip to canvas
        let (x, y) = (dest.x as u64 + xx as u64, dest.y as u64 + yy as u64);
        if x < cw as u64 && y < ch as u64 {
            blend_over(canvas.get_pixel_mut(x as u32, y as u32), *px);
        }
    }
    Ok(crop)
}
