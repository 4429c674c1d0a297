//! Thumbnail pipeline components.
//!
//! The stages a request passes through:
//! - **validate**: Source checks and destination preparation
//! - **dispatch**: Pick a generator and run it
//! - **decode**: Load the intermediate raster
//! - **metadata**: EXIF orientation
//! - **sampling**: Transparency and background heuristics for canvas mode
//! - **thumbnail**: Fit, encode and write the thumbnail
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod dispatch;
pub mod metadata;
pub mod processor;
pub mod sampling;
pub mod thumbnail;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use dispatch::{Attempt, Dispatched, Dispatcher};
pub use metadata::{MetadataExtractor, Orientation};
pub use processor::Orchestrator;
pub use thumbnail::{ProcessedThumbnail, ThumbnailProcessor};
pub use validate::Validator;
