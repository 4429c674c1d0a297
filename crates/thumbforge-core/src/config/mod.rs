//! Configuration management for thumbforge.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default thumbnail settings for requests
    pub thumbnail: ThumbnailConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// External tool overrides, keyed by generator name
    pub tools: ToolsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.thumbforge.thumbforge/config.toml
    /// - Linux: ~/.config/thumbforge/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\thumbforge\config\config.toml
    ///
    /// Falls back to ~/.thumbforge/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "thumbforge", "thumbforge")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".thumbforge").join("config.toml")
            })
    }

    /// Tool override for a generator, with `~` expanded in the program path.
    pub fn tool(&self, generator: &str) -> Option<ToolConfig> {
        self.tools.get(generator).map(|tool| ToolConfig {
            program: shellexpand::tilde(&tool.program).into_owned(),
            args: tool.args.clone(),
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thumbnail.width, 600);
        assert_eq!(config.thumbnail.height, 600);
        assert_eq!(config.thumbnail.quality, 75);
        assert_eq!(config.limits.tool_timeout_ms, 60_000);
        assert!(config.tools.is_empty());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[thumbnail]"));
        assert!(toml.contains("[limits]"));
    }

    #[test]
    fn test_load_from_file_with_tool_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[thumbnail]
width = 320
mode = "canvas"

[tools.video]
program = "~/bin/ffmpeg"
args = ["-i", "{input}", "{output}"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.thumbnail.width, 320);
        assert_eq!(config.thumbnail.height, 600);
        assert_eq!(config.thumbnail.mode, "canvas");

        let tool = config.tool("video").unwrap();
        assert!(!tool.program.starts_with('~'));
        assert!(tool.program.ends_with("bin/ffmpeg"));
        assert_eq!(tool.args.len(), 3);
        assert!(config.tool("pdf").is_none());
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thumbnail]\nquality = 140\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("quality"));
    }
}
