//! Source checks and destination preparation before any generator runs.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{ThumbnailError, ThumbnailResult};

/// Mode for created destination directories, before umask.
#[cfg(unix)]
const DIR_MODE: u32 = 0o777;

/// Validates sources and prepares destinations.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check the source is an existing file within the size limit.
    ///
    /// Has no side effects, so a rejected request leaves the file system
    /// untouched.
    pub fn check_source(&self, path: &Path) -> ThumbnailResult<()> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                return Err(ThumbnailError::InvalidRequest(format!(
                    "source is not a regular file: {}",
                    path.display()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ThumbnailError::SourceNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(ThumbnailError::io(path, e)),
        };

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(ThumbnailError::InvalidRequest(format!(
                "source is {} MB, limit is {} MB: {}",
                metadata.len() / (1024 * 1024),
                self.limits.max_file_size_mb,
                path.display()
            )));
        }

        Ok(())
    }

    /// Check the requested box fits within `max_image_dimension`.
    pub fn check_box(&self, width: u32, height: u32) -> ThumbnailResult<()> {
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(ThumbnailError::InvalidRequest(format!(
                "thumbnail size {width}x{height} exceeds the {max_dim}px limit"
            )));
        }
        Ok(())
    }

    /// Create the destination directory and apply the overwrite policy.
    ///
    /// With `overwrite` set an existing destination is removed, so a later
    /// failure leaves no thumbnail behind. Without it an existing
    /// destination is an error and stays untouched.
    pub fn prepare_destination(&self, destination: &Path, overwrite: bool) -> ThumbnailResult<()> {
        if let Some(dir) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !dir.is_dir() {
                create_dir_all(dir).map_err(|e| ThumbnailError::io(dir, e))?;
                tracing::debug!(dir = %dir.display(), "Created destination directory");
            }
        }

        match std::fs::symlink_metadata(destination) {
            Ok(_) if !overwrite => Err(ThumbnailError::DestinationExists(destination.to_path_buf())),
            Ok(meta) if meta.is_dir() => Err(ThumbnailError::InvalidRequest(format!(
                "destination is a directory: {}",
                destination.display()
            ))),
            Ok(_) => {
                tracing::debug!(destination = %destination.display(), "Removing existing thumbnail");
                std::fs::remove_file(destination).map_err(|e| ThumbnailError::io(destination, e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThumbnailError::io(destination, e)),
        }
    }
}

#[cfg(unix)]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
