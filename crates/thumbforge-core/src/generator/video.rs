//! Video thumbnails: one representative frame extracted by ffmpeg.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["video"], &[]);

/// Extracts a frame from any video ffmpeg can read.
pub struct VideoGenerator {
    tool: ToolCommand,
}

impl VideoGenerator {
    pub const NAME: &'static str = "video";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    /// `thumbnail` picks the most representative frame of the first batch,
    /// which skips black intro frames.
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
                "-vf",
                "thumbnail",
                "-frames:v",
                "1",
                "{output}",
            ],
        )
    }
}

#[async_trait]
impl Generator for VideoGenerator {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_supported_mimes() {
        let gen = VideoGenerator::new(ToolCommand::new(
            VideoGenerator::default_tool(),
            Duration::from_secs(1),
        ));
        assert!(gen.is_supported("video/mp4"));
        assert!(gen.is_supported("video/x-matroska"));
        assert!(!gen.is_supported("audio/mpeg"));
    }
}
