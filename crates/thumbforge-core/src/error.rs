//! Error types for thumbforge.
//!
//! Errors are organized by stage so a failed run can say where it broke
//! (source checks, dispatch, load, encode) and which file was involved.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for thumbforge operations.
#[derive(Error, Debug)]
pub enum ThumbforgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Thumbnail generation errors
    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// A single generator that claimed the source but failed to convert it.
#[derive(Debug, Clone)]
pub struct GeneratorFailure {
    /// Name of the generator that failed
    pub generator: String,
    /// What went wrong
    pub message: String,
}

impl std::fmt::Display for GeneratorFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.generator, self.message)
    }
}

/// Errors raised while turning one source file into one thumbnail.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// Source file does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Destination exists and overwriting is disabled
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Explicit generator hint names no registered generator
    #[error("Unknown generator: {0}")]
    UnknownGenerator(String),

    /// Nothing could produce an intermediate raster for this mime.
    ///
    /// `failures` is empty when no generator claimed the mime at all.
    #[error("{}", no_generator_message(.mime, .failures))]
    NoSupportedGenerator {
        mime: String,
        failures: Vec<GeneratorFailure>,
    },

    /// A generator's external tool failed
    #[error("Generator {generator} failed for {path}: {message}")]
    GeneratorToolFailure {
        generator: String,
        path: PathBuf,
        message: String,
    },

    /// External tool did not finish in time
    #[error("Timeout running {program} for {path} after {timeout_ms}ms")]
    Timeout {
        program: String,
        path: PathBuf,
        timeout_ms: u64,
    },

    /// Intermediate raster missing or undecodable
    #[error("Load error for {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Raster larger than `limits.max_image_dimension` on either side
    #[error("Image too large: {path} ({width}x{height}, max {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Encoding the final thumbnail failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Request parameters are unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Filesystem error outside of load/encode
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ThumbnailError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn no_generator_message(mime: &str, failures: &[GeneratorFailure]) -> String {
    if failures.is_empty() {
        format!("No generator supports {mime}")
    } else {
        let detail: Vec<String> = failures.iter().map(ToString::to_string).collect();
        format!(
            "All generators supporting {mime} failed ({})",
            detail.join("; ")
        )
    }
}

/// Convenience type alias for thumbforge results.
pub type Result<T> = std::result::Result<T, ThumbforgeError>;

/// Convenience type alias for thumbnail-specific results.
pub type ThumbnailResult<T> = std::result::Result<T, ThumbnailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_generator_message_distinguishes_unclaimed() {
        let err = ThumbnailError::NoSupportedGenerator {
            mime: "application/x-unknown".to_string(),
            failures: vec![],
        };
        assert_eq!(err.to_string(), "No generator supports application/x-unknown");
    }

    #[test]
    fn test_no_generator_message_lists_failures() {
        let err = ThumbnailError::NoSupportedGenerator {
            mime: "video/mp4".to_string(),
            failures: vec![GeneratorFailure {
                generator: "video".to_string(),
                message: "ffmpeg not found".to_string(),
            }],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("All generators supporting video/mp4 failed"));
        assert!(msg.contains("video: ffmpeg not found"));
    }
}
