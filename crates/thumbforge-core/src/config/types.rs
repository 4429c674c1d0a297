//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default thumbnail settings applied to new requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Box width in pixels
    pub width: u32,

    /// Box height in pixels
    pub height: u32,

    /// Encoder quality (0-100)
    pub quality: u8,

    /// Fit mode: "crop", "bestfit" or "canvas"
    pub mode: String,

    /// Crop anchor, e.g. "center", "top-left"
    pub anchor: String,

    /// Output mime type
    pub format: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            quality: 75,
            mode: "crop".to_string(),
            anchor: "center".to_string(),
            format: "image/webp".to_string(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Timeout for a single external tool invocation in milliseconds
    pub tool_timeout_ms: u64,

    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum width or height of a decoded raster or requested box, in pixels
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            tool_timeout_ms: 60_000,
            max_file_size_mb: 512,
            max_image_dimension: 10_000,
        }
    }
}

/// Command used by a generator in place of its built-in invocation.
///
/// Arguments may contain `{input}`, `{output}`, `{output_dir}`,
/// `{output_stem}`, `{width}`, `{height}` and `{quality}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable name or path
    pub program: String,

    /// Argument template
    #[serde(default)]
    pub args: Vec<String>,
}

/// Tool overrides keyed by generator name.
pub type ToolsConfig = BTreeMap<String, ToolConfig>;

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
