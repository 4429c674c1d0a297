//! SVG rendering via rsvg-convert.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["image/svg"], &[]);

/// Rasterizes vector images at the requested box size.
pub struct SvgGenerator {
    tool: ToolCommand,
}

impl SvgGenerator {
    pub const NAME: &'static str = "svg";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    pub fn default_tool() -> ToolConfig {
        tool(
            "rsvg-convert",
            &[
                "--keep-aspect-ratio",
                "--width",
                "{width}",
                "--height",
                "{height}",
                "--format",
                "png",
                "--output",
                "{output}",
                "{input}",
            ],
        )
    }
}

#[async_trait]
impl Generator for SvgGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        self.tool.run(Self::NAME, job).await?;
        expect_output(Self::NAME, job, job.output)
    }
}
