//! Pipeline orchestration - wires together all stages for one request.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::generator::GeneratorRegistry;
use crate::mime;
use crate::types::{ConversionRequest, ThumbnailReport};

use super::dispatch::Dispatcher;
use super::thumbnail::ThumbnailProcessor;
use super::validate::Validator;

/// Runs a request from validation to the written thumbnail.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    validator: Validator,
    dispatcher: Dispatcher,
    processor: ThumbnailProcessor,
}

impl Orchestrator {
    pub fn new(config: &Config, registry: Arc<GeneratorRegistry>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            dispatcher: Dispatcher::new(registry),
            processor: ThumbnailProcessor::new(config.limits.clone()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run a request, reporting only success or failure.
    ///
    /// The reason for a failure is logged.
    pub async fn run(&self, request: &ConversionRequest) -> bool {
        match self.try_run(request).await {
            Ok(report) => {
                tracing::info!(
                    source = %report.source.display(),
                    destination = %report.destination.display(),
                    generator = %report.generator,
                    "Thumbnail written ({}x{})",
                    report.width,
                    report.height
                );
                true
            }
            Err(e) => {
                tracing::error!(source = %request.source().display(), "Thumbnail failed: {e}");
                false
            }
        }
    }

    /// Run a request and describe the result.
    ///
    /// Request errors, an unknown generator hint and a missing source are
    /// reported before anything on disk changes.
    pub async fn try_run(&self, request: &ConversionRequest) -> ThumbnailResult<ThumbnailReport> {
        let start = Instant::now();
        tracing::debug!(
            source = %request.source().display(),
            destination = %request.destination().display(),
            "Processing"
        );

        request.check()?;
        self.validator.check_box(request.width, request.height)?;
        let format = mime::image_format_for(&request.destination_mime).ok_or_else(|| {
            ThumbnailError::InvalidRequest(format!(
                "unsupported destination format '{}'",
                request.destination_mime
            ))
        })?;
        self.dispatcher.check_hint(request)?;
        self.validator.check_source(request.source())?;

        self.validator
            .prepare_destination(request.destination(), request.overwrite)?;

        let source_mime = match &request.source_mime {
            Some(m) if !m.trim().is_empty() => m.trim().to_ascii_lowercase(),
            _ => mime::sniff(request.source()),
        };
        tracing::debug!(mime = %source_mime, "Source mime");

        let scratch = tempfile::Builder::new()
            .prefix("thumbforge-")
            .tempdir()
            .map_err(|e| ThumbnailError::io(std::env::temp_dir(), e))?;

        let dispatched = self
            .dispatcher
            .select_and_convert(request, &source_mime, scratch.path())
            .await?;
        let dispatch_time = start.elapsed();
        tracing::trace!("  Dispatch: {:?}", dispatch_time);

        let processor = self.processor.clone();
        let owned = request.clone();
        let intermediate = dispatched.intermediate.clone();
        let processed = tokio::task::spawn_blocking(move || {
            processor.process(&intermediate, &owned, format)
        })
        .await
        .map_err(|e| ThumbnailError::Encode {
            path: request.destination().to_path_buf(),
            message: format!("processing task failed: {e}"),
        })??;

        // Keep the scratch directory until processing has read the intermediate
        drop(scratch);

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{})",
            request.source(),
            start.elapsed(),
            processed.width,
            processed.height
        );

        Ok(ThumbnailReport {
            source: request.source_path.clone(),
            destination: request.destination_path.clone(),
            generator: dispatched.generator,
            mode: request.mode,
            width: processed.width,
            height: processed.height,
            background: processed.background,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Background, Mode};
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::tempdir;

    fn orchestrator() -> Orchestrator {
        let config = Config::default();
        let registry = Arc::new(GeneratorRegistry::builtin(&config));
        Orchestrator::new(&config, registry)
    }

    fn write_png(path: &Path, width: u32, height: u32, px: [u8; 4]) {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(px)))
            .save_with_format(path, image::ImageFormat::Png)
            .unwrap();
    }

    #[tokio::test]
    async fn test_png_passthrough_each_mode() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        write_png(&src, 300, 150, [120, 80, 40, 255]);

        for (mode, expected) in [
            (Mode::Crop, (100, 100)),
            (Mode::Bestfit, (100, 50)),
            (Mode::Canvas, (100, 100)),
        ] {
            let dest = dir.path().join(format!("out/{mode}.webp"));
            let req = ConversionRequest::new(&src, &dest).size(100, 100).mode(mode);
            let report = orchestrator().try_run(&req).await.unwrap();

            assert_eq!(report.generator, "image");
            assert_eq!((report.width, report.height), expected, "{mode}");
            assert_eq!(image::open(&dest).unwrap().dimensions(), expected);
        }
    }

    #[tokio::test]
    async fn test_canvas_reports_inferred_background() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("brown.png");
        let dest = dir.path().join("thumb.png");
        write_png(&src, 40, 20, [120, 80, 40, 255]);

        let req = ConversionRequest::new(&src, &dest)
            .destination_mime("image/png")
            .size(40, 40)
            .mode(Mode::Canvas);
        let report = orchestrator().try_run(&req).await.unwrap();
        assert_eq!(report.background.map(|b| b.to_string()).as_deref(), Some("#785028"));

        let out = image::open(&dest).unwrap();
        assert_eq!(out.get_pixel(0, 0), Rgba([120, 80, 40, 255]));
    }

    #[tokio::test]
    async fn test_canvas_transparent_source() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("clear.png");
        let dest = dir.path().join("thumb.png");
        write_png(&src, 10, 10, [0, 0, 0, 0]);

        let req = ConversionRequest::new(&src, &dest)
            .destination_mime("image/png")
            .size(30, 30)
            .mode(Mode::Canvas);
        let report = orchestrator().try_run(&req).await.unwrap();
        assert_eq!(report.background, Some(Background::Transparent));
    }

    #[tokio::test]
    async fn test_missing_source_creates_nothing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("never/created/thumb.webp");
        let req = ConversionRequest::new(dir.path().join("missing.png"), &dest);

        assert!(!orchestrator().run(&req).await);
        let err = orchestrator().try_run(&req).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::SourceNotFound(_)));
        assert!(!dir.path().join("never").exists());
    }

    #[tokio::test]
    async fn test_no_overwrite_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        let dest = dir.path().join("thumb.webp");
        write_png(&src, 20, 20, [1, 2, 3, 255]);
        std::fs::write(&dest, b"previous").unwrap();

        let req = ConversionRequest::new(&src, &dest).overwrite(false);
        assert!(!orchestrator().run(&req).await);
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_unknown_hint_fails_before_touching_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        let dest = dir.path().join("thumb.webp");
        write_png(&src, 20, 20, [1, 2, 3, 255]);
        std::fs::write(&dest, b"previous").unwrap();

        let req = ConversionRequest::new(&src, &dest).generator("imagemagick");
        let err = orchestrator().try_run(&req).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::UnknownGenerator(ref n) if n == "imagemagick"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_unclaimed_mime_removes_old_thumbnail() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("blob.bin");
        let dest = dir.path().join("thumb.webp");
        std::fs::write(&src, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        std::fs::write(&dest, b"previous").unwrap();

        let req = ConversionRequest::new(&src, &dest);
        let err = orchestrator().try_run(&req).await.unwrap_err();
        assert!(matches!(
            err,
            ThumbnailError::NoSupportedGenerator { ref failures, .. } if failures.is_empty()
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_thin_strip_crops_to_full_box() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("strip.png");
        let dest = dir.path().join("thumb.webp");
        write_png(&src, 1, 4000, [30, 60, 90, 255]);

        let req = ConversionRequest::new(&src, &dest);
        let report = orchestrator().try_run(&req).await.unwrap();
        assert_eq!((report.width, report.height), (600, 600));
        assert_eq!(image::open(&dest).unwrap().dimensions(), (600, 600));
    }

    #[tokio::test]
    async fn test_oversized_box_fails_before_touching_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        let dest = dir.path().join("thumb.webp");
        write_png(&src, 20, 20, [1, 2, 3, 255]);
        std::fs::write(&dest, b"previous").unwrap();

        let req = ConversionRequest::new(&src, &dest).size(20_000, 10);
        let err = orchestrator().try_run(&req).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::InvalidRequest(_)));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_out_of_range_quality_is_encoded_at_max() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        let dest = dir.path().join("thumb.jpg");
        write_png(&src, 20, 20, [1, 2, 3, 255]);

        let mut req = ConversionRequest::new(&src, &dest)
            .destination_mime("image/jpeg")
            .size(10, 10);
        req.quality = 250;
        let report = orchestrator().try_run(&req).await.unwrap();
        assert_eq!((report.width, report.height), (10, 10));
    }

    #[tokio::test]
    async fn test_unsupported_destination_format() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("photo.png");
        write_png(&src, 20, 20, [1, 2, 3, 255]);

        let req = ConversionRequest::new(&src, dir.path().join("thumb.xyz"))
            .destination_mime("application/pdf");
        let err = orchestrator().try_run(&req).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_explicit_source_mime_skips_sniffing() {
        let dir = tempdir().unwrap();
        // PNG content under a misleading name
        let src = dir.path().join("photo.dat");
        let dest = dir.path().join("thumb.jpg");
        write_png(&src, 20, 10, [200, 10, 10, 255]);

        let req = ConversionRequest::new(&src, &dest)
            .source_mime("image/png")
            .destination_mime("image/jpeg")
            .size(10, 10);
        let report = orchestrator().try_run(&req).await.unwrap();
        assert_eq!(report.generator, "image");
        assert_eq!(&std::fs::read(&dest).unwrap()[0..2], &[0xFF, 0xD8]);
    }
}
