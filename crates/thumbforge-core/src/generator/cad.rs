//! CAD and 3D models rendered offscreen by f3d.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(
    &["model/x-"],
    &[
        "application/acad",
        "application/dxf",
        "application/x-extension-fcstd",
    ],
);

/// Renders a model at the requested box size.
pub struct CadGenerator {
    tool: ToolCommand,
}

impl CadGenerator {
    pub const NAME: &'static str = "cad";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    pub fn default_tool() -> ToolConfig {
        tool(
            "f3d",
            &[
                "{input}",
                "--output={output}",
                "--resolution={width},{height}",
            ],
        )
    }
}

#[async_trait]
impl Generator for CadGenerator {
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
