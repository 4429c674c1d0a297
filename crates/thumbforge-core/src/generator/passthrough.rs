//! Raster images the decoder reads directly.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{ThumbnailError, ThumbnailResult};

use super::{Generator, GeneratorJob, MimeMatcher};

const MIMES: MimeMatcher = MimeMatcher::new(&["image/"], &[]);

/// Hands the source itself to the thumbnail stage; no tool involved.
///
/// Only claims success when the decoder can read the file's header, so
/// e.g. HEIC reports a generator failure rather than a load error later.
#[derive(Debug, Default)]
pub struct ImageGenerator;

impl ImageGenerator {
    pub const NAME: &'static str = "image";
}

#[async_trait]
impl Generator for ImageGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        let failure = |message: String| ThumbnailError::GeneratorToolFailure {
            generator: Self::NAME.to_string(),
            path: job.source.to_path_buf(),
            message,
        };

        let reader = image::ImageReader::open(job.source)
            .map_err(|e| failure(format!("cannot open: {e}")))?
            .with_guessed_format()
            .map_err(|e| failure(format!("cannot detect format: {e}")))?;

        // Reading the header catches content the extension misnames
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| failure(format!("{} is not a decodable raster: {e}", job.mime)))?;
        tracing::trace!(width, height, "Raster header readable");
        Ok(job.source.to_path_buf())
    }
}
