//! Loading intermediate rasters with format detection and orientation fix-up.

use image::ImageDecoder as _;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::ThumbnailError;

use super::metadata::MetadataExtractor;

/// Loads rasters produced by generators, within configured limits.
#[derive(Debug, Clone, Default)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data, upright
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels (after orientation)
    pub width: u32,
    /// Image height in pixels (after orientation)
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode a file, detecting the format from its content.
    ///
    /// The file extension is only a fallback: generators often write data
    /// whose format does not match the scratch file name. Dimensions are
    /// checked against `max_image_dimension` from the header, before any
    /// pixel buffer is allocated.
    pub fn load(&self, path: &Path) -> Result<DecodedImage, ThumbnailError> {
        let load_error = |message: String| ThumbnailError::Load {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(load_error("file not found".to_string()));
        }

        let reader = image::ImageReader::open(path)
            .map_err(|e| load_error(format!("Cannot open file: {}", e)))?
            .with_guessed_format()
            .map_err(|e| load_error(format!("Cannot detect image format: {}", e)))?;
        let format = reader
            .format()
            .ok_or_else(|| load_error("Unrecognized image format".to_string()))?;

        let decoder = reader
            .into_decoder()
            .map_err(|e| load_error(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(ThumbnailError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }
        let image = DynamicImage::from_decoder(decoder).map_err(|e| load_error(e.to_string()))?;

        let image = match MetadataExtractor::orientation(path) {
            Some(orientation) => {
                tracing::trace!(?orientation, "Applying EXIF orientation");
                orientation.apply(image)
            }
            None => image,
        };

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}
