//! Generators turn a source file into an intermediate raster.
//!
//! Each generator claims a family of mime types and knows how to drive one
//! external tool (ffmpeg, LibreOffice, pdftoppm, ...). The set is closed:
//! [`GeneratorRegistry::builtin`] lists them in dispatch order.

pub mod audio;
pub mod cad;
pub mod document;
pub mod ebook;
pub mod passthrough;
pub mod pdf;
pub mod raw;
pub mod registry;
pub mod svg;
pub mod tool;
pub mod video;

pub use registry::GeneratorRegistry;
pub use tool::ToolCommand;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{ThumbnailError, ThumbnailResult};

/// Inputs for one conversion.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorJob<'a> {
    /// File being converted
    pub source: &'a Path,
    /// Mime of the source
    pub mime: &'a str,
    /// Where the generator should place its raster
    pub output: &'a Path,
    /// Requested box width
    pub width: u32,
    /// Requested box height
    pub height: u32,
    /// Requested quality (0-100)
    pub quality: u8,
}

impl GeneratorJob<'_> {
    /// Scratch directory holding `output`.
    pub fn output_dir(&self) -> &Path {
        self.output.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Trait that all generators implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry holds `Box<dyn Generator>`).
#[async_trait]
pub trait Generator: Send + Sync {
    /// Stable name, also accepted as an explicit generator hint.
    fn name(&self) -> &str;

    /// Whether this generator claims the mime type.
    fn is_supported(&self, mime: &str) -> bool;

    /// Produce an intermediate raster and return its path.
    ///
    /// The returned path is usually `job.output`, but may differ when the
    /// tool picks its own file name or the source can be used as is.
    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf>;
}

/// Mime predicate: substring patterns plus an exact-match list.
#[derive(Debug, Clone, Copy)]
pub struct MimeMatcher {
    patterns: &'static [&'static str],
    exact: &'static [&'static str],
}

impl MimeMatcher {
    pub const fn new(patterns: &'static [&'static str], exact: &'static [&'static str]) -> Self {
        Self { patterns, exact }
    }

    /// True if any pattern occurs in `mime` or `mime` equals a listed type.
    pub fn matches(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        self.patterns.iter().any(|p| mime.contains(p)) || self.exact.iter().any(|e| mime == *e)
    }
}

/// Check that a tool actually left a non-empty file behind.
pub(crate) fn expect_output(generator: &str, job: &GeneratorJob<'_>, path: &Path) -> ThumbnailResult<PathBuf> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(path.to_path_buf()),
        _ => Err(ThumbnailError::GeneratorToolFailure {
            generator: generator.to_string(),
            path: job.source.to_path_buf(),
            message: format!("no output written to {}", path.display()),
        }),
    }
}
