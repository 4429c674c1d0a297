//! Thumbforge Core - Embeddable thumbnail generation library.
//!
//! Thumbforge turns an arbitrary file (video, image, PDF, audio, office
//! document, CAD model, ebook, vector image) into a fixed-size raster
//! thumbnail.
//!
//! # Architecture
//!
//! ```text
//! Validate → Dispatch (generator → intermediate raster) → Decode → Fit (crop/bestfit/canvas) → Encode
//! ```
//!
//! Generators wrap external tools and are tried in registry order; the
//! first one that succeeds wins. Everything after dispatch happens in
//! process with the `image` crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use thumbforge_core::{Config, Mode, Thumbforge};
//!
//! #[tokio::main]
//! async fn main() -> thumbforge_core::Result<()> {
//!     let thumbforge = Thumbforge::new(Config::load()?);
//!
//!     let request = thumbforge
//!         .request("./report.pdf", "./thumbs/report.webp")
//!         .size(300, 300)
//!         .mode(Mode::Canvas);
//!     let report = thumbforge.try_run(&request).await?;
//!     println!("Generated by {}", report.generator);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod generator;
pub mod mime;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, GeneratorFailure, Result, ThumbforgeError, ThumbnailError, ThumbnailResult,
};
pub use generator::{Generator, GeneratorRegistry};
pub use pipeline::Orchestrator;
pub use types::{
    Anchor, Background, ConversionRequest, Mode, SampleColor, ThumbnailReport, AUTO_GENERATOR,
};

use std::path::PathBuf;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Thumbforge - the main entry point for thumbnail generation.
///
/// Holds the configuration and the generator registry. Cheap to clone and
/// safe to share across tasks; runs on distinct destinations may proceed
/// concurrently.
#[derive(Debug, Clone)]
pub struct Thumbforge {
    config: Arc<Config>,
    registry: Arc<GeneratorRegistry>,
    orchestrator: Orchestrator,
}

impl Thumbforge {
    /// Create an instance with the built-in generators.
    pub fn new(config: Config) -> Self {
        let registry = GeneratorRegistry::builtin(&config);
        Self::with_registry(config, registry)
    }

    /// Create an instance from the configuration file, or defaults if absent.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Create an instance with a custom generator registry.
    pub fn with_registry(config: Config, registry: GeneratorRegistry) -> Self {
        tracing::debug!("Initializing Thumbforge v{}", VERSION);
        let registry = Arc::new(registry);
        let orchestrator = Orchestrator::new(&config, registry.clone());
        Self {
            config: Arc::new(config),
            registry,
            orchestrator,
        }
    }

    /// Start a request using the configured thumbnail defaults.
    pub fn request(
        &self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> ConversionRequest {
        ConversionRequest::with_defaults(source, destination, &self.config.thumbnail)
    }

    /// Run a request; `false` on any failure (the reason is logged).
    pub async fn run(&self, request: &ConversionRequest) -> bool {
        self.orchestrator.run(request).await
    }

    /// Run a request and return a report or the reason it failed.
    pub async fn try_run(&self, request: &ConversionRequest) -> ThumbnailResult<ThumbnailReport> {
        self.orchestrator.try_run(request).await
    }

    /// Single-call entry point with automatic generator selection.
    ///
    /// Size and quality come from the configuration.
    pub async fn create(
        &self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        destination_mime: &str,
        mode: Mode,
        overwrite: bool,
    ) -> bool {
        let request = self
            .request(source, destination)
            .destination_mime(destination_mime)
            .mode(mode)
            .overwrite(overwrite);
        self.run(&request).await
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the generator registry.
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }
}
