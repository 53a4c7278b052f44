use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};

use crate::config::OutputFormat;
use crate::error::{NewsboothError, Result};

/// Finished, encoded composite. Self-contained: holds every byte of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:<mime>;base64,...` form, suitable for an `<img src>` or a download link.
    pub fn to_data_url(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type(), payload)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode `canvas` at the highest quality the format offers.
pub fn encode(canvas: &RgbaImage, format: OutputFormat) -> Result<Artifact> {
    let (width, height) = canvas.dimensions();
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive);
            encoder
                .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| NewsboothError::Encode(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha; the canvas is opaque so dropping it is lossless.
            let rgb = RgbImage::from_fn(width, height, |x, y| {
                let p = canvas.get_pixel(x, y);
                Rgb([p[0], p[1], p[2]])
            });
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 100);
            encoder
                .encode_image(&rgb)
                .map_err(|e| NewsboothError::Encode(e.to_string()))?;
        }
    }
    Ok(Artifact {
        format,
        width,
        height,
        bytes,
    })
}
