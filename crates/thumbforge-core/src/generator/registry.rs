//! The ordered, read-only list of generators.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::Config;
use crate::error::ConfigError;

use super::audio::AudioGenerator;
use super::cad::CadGenerator;
use super::document::DocumentGenerator;
use super::ebook::EbookGenerator;
use super::passthrough::ImageGenerator;
use super::pdf::PdfGenerator;
use super::raw::RawGenerator;
use super::svg::SvgGenerator;
use super::video::VideoGenerator;
use super::{Generator, ToolCommand};

/// Generators in dispatch order. The first one that claims a mime wins.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// The built-in generators, with tool overrides and timeout from config.
    ///
    /// `svg` and `raw` come before `image`, which would otherwise claim every
    /// `image/*` mime.
    pub fn builtin(config: &Config) -> Self {
        let timeout = Duration::from_millis(config.limits.tool_timeout_ms);
        let command = |name: &str, default| ToolCommand::resolve(default, config.tool(name), timeout);

        let pdf = PdfGenerator::new(command(PdfGenerator::NAME, PdfGenerator::default_tool()));

        let generators: Vec<Box<dyn Generator>> = vec![
            Box::new(VideoGenerator::new(command(
                VideoGenerator::NAME,
                VideoGenerator::default_tool(),
            ))),
            Box::new(SvgGenerator::new(command(
                SvgGenerator::NAME,
                SvgGenerator::default_tool(),
            ))),
            Box::new(RawGenerator::new(command(
                RawGenerator::NAME,
                RawGenerator::default_tool(),
            ))),
            Box::new(ImageGenerator),
            Box::new(pdf.clone()),
            Box::new(AudioGenerator::new(command(
                AudioGenerator::NAME,
                AudioGenerator::default_tool(),
            ))),
            Box::new(DocumentGenerator::new(
                command(DocumentGenerator::NAME, DocumentGenerator::default_tool()),
                pdf,
            )),
            Box::new(CadGenerator::new(command(
                CadGenerator::NAME,
                CadGenerator::default_tool(),
            ))),
            Box::new(EbookGenerator::new(command(
                EbookGenerator::NAME,
                EbookGenerator::default_tool(),
            ))),
        ];

        Self { generators }
    }

    /// Build a registry from an explicit list, keeping its order.
    ///
    /// Fails if two generators share a name, since names double as hints.
    pub fn from_generators(generators: Vec<Box<dyn Generator>>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for generator in &generators {
            if !seen.insert(generator.name().to_string()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate generator name '{}'",
                    generator.name()
                )));
            }
        }
        Ok(Self { generators })
    }

    /// Look up a generator by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Generator> {
        self.generators
            .iter()
            .find(|g| g.name() == name)
            .map(|g| g.as_ref())
    }

    /// All generators in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.iter().map(|g| g.as_ref())
    }

    /// Generators claiming `mime`, in dispatch order.
    pub fn supporting<'a>(&'a self, mime: &'a str) -> impl Iterator<Item = &'a dyn Generator> + 'a {
        self.iter().filter(move |g| g.is_supported(mime))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;

    fn first_for(registry: &GeneratorRegistry, mime: &str) -> Option<String> {
        registry.supporting(mime).next().map(|g| g.name().to_string())
    }

    #[test]
    fn test_builtin_order() {
        let registry = GeneratorRegistry::builtin(&Config::default());
        assert_eq!(
            registry.names(),
            vec!["video", "svg", "raw", "image", "pdf", "audio", "document", "cad", "ebook"]
        );
    }

    #[test]
    fn test_builtin_first_match() {
        let registry = GeneratorRegistry::builtin(&Config::default());
        let cases = [
            ("video/mp4", "video"),
            ("image/svg+xml", "svg"),
            ("image/x-canon-cr2", "raw"),
            ("image/png", "image"),
            ("application/pdf", "pdf"),
            ("audio/mpeg", "audio"),
            ("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", "document"),
            ("text/csv", "document"),
            ("model/x-stl", "cad"),
            ("application/dxf", "cad"),
            ("application/epub+zip", "ebook"),
        ];
        for (mime, expected) in cases {
            assert_eq!(first_for(&registry, mime).as_deref(), Some(expected), "{mime}");
        }
        assert_eq!(first_for(&registry, "application/octet-stream"), None);
    }

    #[test]
    fn test_raw_also_claimed_by_image_later() {
        let registry = GeneratorRegistry::builtin(&Config::default());
        let names: Vec<&str> = registry.supporting("image/x-adobe-dng").map(|g| g.name()).collect();
        assert_eq!(names, vec!["raw", "image"]);
    }

    #[test]
    fn test_get_by_name() {
        let registry = GeneratorRegistry::builtin(&Config::default());
        assert_eq!(registry.get("pdf").map(|g| g.name()), Some("pdf"));
        assert!(registry.get("PDF").is_none());
        assert!(registry.get("auto").is_none());
    }

    #[test]
    fn test_from_generators_rejects_duplicates() {
        let generators: Vec<Box<dyn Generator>> = vec![Box::new(ImageGenerator), Box::new(ImageGenerator)];
        let err = GeneratorRegistry::from_generators(generators).unwrap_err();
        assert!(err.to_string().contains("duplicate generator name 'image'"));
    }

    #[test]
    fn test_builtin_applies_tool_override() {
        let mut config = Config::default();
        config.tools.insert(
            "video".into(),
            ToolConfig {
                program: "/opt/ffmpeg/bin/ffmpeg".into(),
                args: vec!["{input}".into(), "{output}".into()],
            },
        );
        let registry = GeneratorRegistry::builtin(&config);
        assert_eq!(registry.len(), 9);
        assert!(registry.get("video").is_some());
    }
}
