//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::mime;
use crate::types::{Anchor, Mode};

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.width and thumbnail.height must be > 0".into(),
            ));
        }
        if self.thumbnail.quality > 100 {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 0 and 100".into(),
            ));
        }
        if self.thumbnail.mode.parse::<Mode>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "thumbnail.mode '{}' is not one of crop, bestfit, canvas",
                self.thumbnail.mode
            )));
        }
        if self.thumbnail.anchor.parse::<Anchor>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "thumbnail.anchor '{}' is not a known anchor",
                self.thumbnail.anchor
            )));
        }
        if mime::image_format_for(&self.thumbnail.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "thumbnail.format '{}' is not a writable image mime",
                self.thumbnail.format
            )));
        }
        if self.limits.tool_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.tool_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        for (name, tool) in &self.tools {
            if tool.program.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "tools.{name}.program must not be empty"
                )));
            }
        }
        Ok(())
    }
}
