//! Pixel sampling heuristics for canvas mode.
//!
//! Both checks look at a handful of fixed points rather than every pixel.
//! Transparency away from the center and the corners goes unnoticed, and a
//! background is inferred from the border only.

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::mime;
use crate::types::{Background, SampleColor};

/// Distance from the border for background samples.
const EDGE_INSET: u32 = 2;

/// Channels above this count towards near-white.
const NEAR_WHITE_MIN: u8 = 240;

/// Max spread between channels for a near-white sample.
const NEAR_WHITE_MAX_SPREAD: u8 = 10;

/// Share of near-white samples (in percent) that makes the background white.
const WHITE_MAJORITY_PERCENT: usize = 60;

/// Center plus the four corners.
pub fn transparency_points(width: u32, height: u32) -> [(u32, u32); 5] {
    let (right, bottom) = (width.saturating_sub(1), height.saturating_sub(1));
    [
        (width / 2, height / 2),
        (0, 0),
        (right, 0),
        (0, bottom),
        (right, bottom),
    ]
}

/// Corners and edge midpoints, inset from the border.
///
/// Coordinates are clamped into images narrower than the inset.
pub fn background_points(width: u32, height: u32) -> [(u32, u32); 8] {
    let (max_x, max_y) = (width.saturating_sub(1), height.saturating_sub(1));
    let left = EDGE_INSET.min(max_x);
    let right = max_x.saturating_sub(EDGE_INSET);
    let top = EDGE_INSET.min(max_y);
    let bottom = max_y.saturating_sub(EDGE_INSET);
    let (mid_x, mid_y) = (width / 2, height / 2);
    [
        (left, top),
        (right, top),
        (left, bottom),
        (right, bottom),
        (mid_x, top),
        (mid_x, bottom),
        (left, mid_y),
        (right, mid_y),
    ]
}

/// Whether the image shows transparency at any transparency sample point.
///
/// Formats without an alpha channel are always opaque.
pub fn has_transparency(image: &DynamicImage, format: ImageFormat) -> bool {
    if !mime::is_alpha_capable(format) {
        return false;
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return false;
    }
    transparency_points(width, height)
        .iter()
        .any(|&(x, y)| image.get_pixel(x, y).0[3] < u8::MAX)
}

/// R, G and B all very bright and nearly equal.
pub fn is_near_white(color: SampleColor) -> bool {
    let channels = [color.r, color.g, color.b];
    let max = channels.iter().copied().max().unwrap_or(0);
    let min = channels.iter().copied().min().unwrap_or(0);
    channels.iter().all(|&c| c > NEAR_WHITE_MIN) && max - min < NEAR_WHITE_MAX_SPREAD
}

/// Pick a solid background matching the image border.
///
/// Pure white if most samples are near-white, otherwise the rounded mean
/// color of all samples.
pub fn infer_background(image: &DynamicImage) -> SampleColor {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return SampleColor::WHITE;
    }

    let samples: Vec<SampleColor> = background_points(width, height)
        .iter()
        .map(|&(x, y)| SampleColor::from(image.get_pixel(x, y)))
        .collect();

    let white = samples.iter().filter(|&&c| is_near_white(c)).count();
    if white * 100 >= samples.len() * WHITE_MAJORITY_PERCENT {
        return SampleColor::WHITE;
    }

    let n = samples.len() as f64;
    let mean = |channel: fn(&SampleColor) -> u8| -> u8 {
        let sum: u32 = samples.iter().map(|c| channel(c) as u32).sum();
        (sum as f64 / n).round() as u8
    };
    SampleColor::rgb(mean(|c| c.r), mean(|c| c.g), mean(|c| c.b))
}

/// Background for a canvas behind `image`.
pub fn choose_background(image: &DynamicImage, format: ImageFormat) -> Background {
    if has_transparency(image, format) {
        Background::Transparent
    } else {
        Background::Solid(infer_background(image))
    }
}
