//! Audio thumbnails: the embedded cover art, pulled out by ffmpeg.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["audio"], &[]);

/// Writes the attached picture stream of an audio file.
///
/// Files without cover art fail, which lets a later generator try.
pub struct AudioGenerator {
    tool: ToolCommand,
}

impl AudioGenerator {
    pub const NAME: &'static str = "audio";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    pub fn default_tool() -> ToolConfig {
        tool(
            "ffmpeg",
            &[
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "{input}",
                "-an",
                "-frames:v",
                "1",
                "{output}",
            ],
        )
    }
}

#[async_trait]
impl Generator for AudioGenerator {
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
