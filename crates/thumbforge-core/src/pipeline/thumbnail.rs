//! Fitting generator output into the requested box and writing the result.

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::mime;
use crate::types::{Anchor, Background, ConversionRequest, Mode, SampleColor};

use super::decode::ImageDecoder;
use super::sampling;

/// AVIF encoder speed (1 slowest, 10 fastest).
const AVIF_SPEED: u8 = 8;

/// Dimensions and background of a written thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessedThumbnail {
    pub width: u32,
    pub height: u32,
    /// Set in canvas mode only
    pub background: Option<Background>,
}

/// Turns an intermediate raster into the final thumbnail file.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailProcessor {
    decoder: ImageDecoder,
}

impl ThumbnailProcessor {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            decoder: ImageDecoder::new(limits),
        }
    }

    /// Load `intermediate`, fit it per `request.mode` and write it to the
    /// request destination encoded as `format`.
    ///
    /// The destination only appears once the encoded bytes are complete.
    pub fn process(
        &self,
        intermediate: &Path,
        request: &ConversionRequest,
        format: ImageFormat,
    ) -> ThumbnailResult<ProcessedThumbnail> {
        let decoded = self.decoder.load(intermediate)?;
        let (width, height) = (request.width, request.height);

        let (image, background) = match request.mode {
            Mode::Crop => (crop(&decoded.image, width, height, request.anchor), None),
            Mode::Bestfit => (bestfit(&decoded.image, width, height), None),
            Mode::Canvas => {
                let fitted = bestfit(&decoded.image, width, height);
                let background = sampling::choose_background(&fitted, decoded.format);
                (canvas(&fitted, width, height, background), Some(background))
            }
        };

        tracing::debug!(
            source_format = ?decoded.format,
            source_width = decoded.width,
            source_height = decoded.height,
            width = image.width(),
            height = image.height(),
            mode = %request.mode,
            "Fitted thumbnail"
        );

        let destination = request.destination();
        let bytes = encode(&image, format, request.quality).map_err(|message| {
            ThumbnailError::Encode {
                path: destination.to_path_buf(),
                message,
            }
        })?;
        write_atomic(destination, &bytes)?;

        Ok(ProcessedThumbnail {
            width: image.width(),
            height: image.height(),
            background,
        })
    }
}

/// Fill the box exactly, dropping the excess around `anchor`.
///
/// The window is cut in source coordinates first, so only the box itself
/// is ever allocated at output size.
pub fn crop(image: &DynamicImage, width: u32, height: u32, anchor: Anchor) -> DynamicImage {
    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return image.clone();
    }
    if src_w == 0 || src_h == 0 {
        return DynamicImage::new_rgba8(width, height);
    }
    let scale = f64::max(width as f64 / src_w as f64, height as f64 / src_h as f64);
    let window_w = ((width as f64 / scale).round() as u32).clamp(1, src_w);
    let window_h = ((height as f64 / scale).round() as u32).clamp(1, src_h);

    let (x, y) = anchor.offset((src_w, src_h), (window_w, window_h));
    image
        .crop_imm(x, y, window_w, window_h)
        .resize_exact(width, height, FilterType::Lanczos3)
}

/// Largest aspect-preserving size that fits inside the box.
pub fn bestfit(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize(width, height, FilterType::Lanczos3)
}

/// Center `fitted` on a box-sized background.
pub fn canvas(fitted: &DynamicImage, width: u32, height: u32, background: Background) -> DynamicImage {
    let mut base = RgbaImage::from_pixel(width, height, Rgba::from(background.color()));
    let (x, y) = Anchor::Center.offset((width, height), fitted.dimensions());
    imageops::overlay(&mut base, &fitted.to_rgba8(), x as i64, y as i64);
    DynamicImage::ImageRgba8(base)
}

/// Encode into memory. Quality applies to the lossy formats (JPEG, WebP, AVIF).
fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Cursor::new(Vec::new());
    let quality = quality.clamp(1, 100);

    match format {
        ImageFormat::Jpeg => {
            let rgb = flatten(image, SampleColor::WHITE).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            DynamicImage::ImageRgb8(rgb)
                .write_with_encoder(encoder)
                .map_err(|e| e.to_string())?;
        }
        ImageFormat::WebP => {
            let normalized = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            let encoder = webp::Encoder::from_image(&normalized).map_err(|e| e.to_string())?;
            buffer
                .write_all(&encoder.encode(quality as f32))
                .map_err(|e| e.to_string())?;
        }
        ImageFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut buffer, AVIF_SPEED, quality);
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| e.to_string())?;
        }
        _ => {
            let normalized = if mime::is_alpha_capable(format) {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(flatten(image, SampleColor::WHITE).to_rgb8())
            };
            normalized
                .write_to(&mut buffer, format)
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(buffer.into_inner())
}

/// Blend translucent pixels over `matte` for formats without alpha.
fn flatten(image: &DynamicImage, matte: SampleColor) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }
    let mut rgba = image.to_rgba8();
    for px in rgba.pixels_mut() {
        let alpha = px.0[3] as u32;
        if alpha == 255 {
            continue;
        }
        let blend = |c: u8, m: u8| ((c as u32 * alpha + m as u32 * (255 - alpha) + 127) / 255) as u8;
        *px = Rgba([
            blend(px.0[0], matte.r),
            blend(px.0[1], matte.g),
            blend(px.0[2], matte.b),
            255,
        ]);
    }
    DynamicImage::ImageRgba8(rgba)
}

/// Write through a temp file in the destination directory, then rename.
fn write_atomic(destination: &Path, bytes: &[u8]) -> ThumbnailResult<()> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".thumbforge-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| ThumbnailError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ThumbnailError::io(tmp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| ThumbnailError::io(tmp.path(), e))?;
    }

    tmp.persist(destination)
        .map_err(|e| ThumbnailError::io(destination, e.error))?;
    Ok(())
}
