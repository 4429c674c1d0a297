//! Core data types for thumbnail requests and results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::ThumbnailConfig;
use crate::error::ThumbnailError;

/// Generator hint that lets the dispatcher pick by mime type.
pub const AUTO_GENERATOR: &str = "auto";

/// How the generator output is fitted into the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fill the box exactly, cropping the excess around the anchor
    #[default]
    Crop,
    /// Fit inside the box keeping the aspect ratio
    Bestfit,
    /// Bestfit, then center on a box-sized background
    Canvas,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Crop => write!(f, "crop"),
            Mode::Bestfit => write!(f, "bestfit"),
            Mode::Canvas => write!(f, "canvas"),
        }
    }
}

impl FromStr for Mode {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crop" => Ok(Mode::Crop),
            "bestfit" => Ok(Mode::Bestfit),
            "canvas" => Ok(Mode::Canvas),
            other => Err(ThumbnailError::InvalidRequest(format!(
                "unknown mode '{other}' (expected crop, bestfit or canvas)"
            ))),
        }
    }
}

/// Which part of the image survives a crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// Offset of a `inner`-sized window inside `outer` along each axis.
    pub fn offset(&self, outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
        let spare_x = outer.0.saturating_sub(inner.0);
        let spare_y = outer.1.saturating_sub(inner.1);
        let x = match self {
            Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft => 0,
            Anchor::Top | Anchor::Center | Anchor::Bottom => spare_x / 2,
            Anchor::TopRight | Anchor::Right | Anchor::BottomRight => spare_x,
        };
        let y = match self {
            Anchor::TopLeft | Anchor::Top | Anchor::TopRight => 0,
            Anchor::Left | Anchor::Center | Anchor::Right => spare_y / 2,
            Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight => spare_y,
        };
        (x, y)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Anchor::TopLeft => "top-left",
            Anchor::Top => "top",
            Anchor::TopRight => "top-right",
            Anchor::Left => "left",
            Anchor::Center => "center",
            Anchor::Right => "right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::Bottom => "bottom",
            Anchor::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

impl FromStr for Anchor {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let anchor = match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" => Anchor::TopLeft,
            "top" => Anchor::Top,
            "top-right" => Anchor::TopRight,
            "left" => Anchor::Left,
            "center" | "centre" => Anchor::Center,
            "right" => Anchor::Right,
            "bottom-left" => Anchor::BottomLeft,
            "bottom" => Anchor::Bottom,
            "bottom-right" => Anchor::BottomRight,
            other => {
                return Err(ThumbnailError::InvalidRequest(format!(
                    "unknown anchor '{other}'"
                )))
            }
        };
        Ok(anchor)
    }
}

/// An RGBA sample; alpha 255 is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SampleColor {
    pub const WHITE: SampleColor = SampleColor::rgb(255, 255, 255);
    pub const TRANSPARENT: SampleColor = SampleColor {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Hex notation without alpha, e.g. `#785028`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<image::Rgba<u8>> for SampleColor {
    fn from(px: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

impl From<SampleColor> for image::Rgba<u8> {
    fn from(c: SampleColor) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

/// Canvas background chosen for canvas mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "color")]
pub enum Background {
    Transparent,
    Solid(SampleColor),
}

impl Background {
    pub fn color(&self) -> SampleColor {
        match self {
            Background::Transparent => SampleColor::TRANSPARENT,
            Background::Solid(c) => *c,
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Transparent => write!(f, "transparent"),
            Background::Solid(c) => f.write_str(&c.to_hex()),
        }
    }
}

/// Everything needed to produce one thumbnail.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// File to make a thumbnail of
    pub source_path: PathBuf,
    /// Source mime; sniffed from the file when `None`
    pub source_mime: Option<String>,
    /// Where the thumbnail is written
    pub destination_path: PathBuf,
    /// Output format, e.g. "image/webp"
    pub destination_mime: String,
    /// Box width in pixels
    pub width: u32,
    /// Box height in pixels
    pub height: u32,
    /// Encoder quality 0-100; anything above is encoded as 100
    pub quality: u8,
    pub mode: Mode,
    /// Crop anchor (crop mode only)
    pub anchor: Anchor,
    /// "auto" or the name of a registered generator
    pub generator_hint: String,
    /// Replace an existing destination file
    pub overwrite: bool,
}

impl ConversionRequest {
    /// Create a request with the built-in defaults (600x600, quality 75, WebP, crop).
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::with_defaults(source, destination, &ThumbnailConfig::default())
    }

    /// Create a request taking box size, quality, mode and format from config.
    ///
    /// Mode and anchor strings are validated with the config, so unknown
    /// values fall back to the defaults here.
    pub fn with_defaults(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        defaults: &ThumbnailConfig,
    ) -> Self {
        Self {
            source_path: source.into(),
            source_mime: None,
            destination_path: destination.into(),
            destination_mime: defaults.format.clone(),
            width: defaults.width,
            height: defaults.height,
            quality: defaults.quality.min(100),
            mode: defaults.mode.parse().unwrap_or_default(),
            anchor: defaults.anchor.parse().unwrap_or_default(),
            generator_hint: AUTO_GENERATOR.to_string(),
            overwrite: true,
        }
    }

    pub fn source_mime(mut self, mime: impl Into<String>) -> Self {
        self.source_mime = Some(mime.into());
        self
    }

    pub fn destination_mime(mut self, mime: impl Into<String>) -> Self {
        self.destination_mime = mime.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality, clamped to 100.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn generator(mut self, hint: impl Into<String>) -> Self {
        self.generator_hint = hint.into();
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// True when the dispatcher should pick a generator by mime.
    pub fn is_auto(&self) -> bool {
        self.generator_hint.is_empty() || self.generator_hint.eq_ignore_ascii_case(AUTO_GENERATOR)
    }

    /// Reject requests the pipeline cannot honor.
    pub fn check(&self) -> Result<(), ThumbnailError> {
        if self.width == 0 || self.height == 0 {
            return Err(ThumbnailError::InvalidRequest(format!(
                "thumbnail size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn source(&self) -> &Path {
        &self.source_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Generator that produced the intermediate raster
    pub generator: String,
    pub mode: Mode,
    /// Final thumbnail width in pixels
    pub width: u32,
    /// Final thumbnail height in pixels
    pub height: u32,
    /// Background used in canvas mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

impl ThumbnailReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
