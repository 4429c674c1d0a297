//! Camera raw files (CR2, NEF, DNG, ...) developed by dcraw.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::{ThumbnailError, ThumbnailResult};

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["image/x-"], &[]);

/// Develops a raw file to TIFF.
///
/// dcraw writes to stdout with `-c`; whatever the tool prints is saved as the
/// intermediate unless the tool already wrote `{output}` itself.
pub struct RawGenerator {
    tool: ToolCommand,
}

impl RawGenerator {
    pub const NAME: &'static str = "raw";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    /// Camera white balance, half size (fast, and plenty for a thumbnail).
    pub fn default_tool() -> ToolConfig {
        tool("dcraw", &["-c", "-w", "-h", "-T", "{input}"])
    }
}

#[async_trait]
impl Generator for RawGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        let stdout = self.tool.run(Self::NAME, job).await?;
        if !stdout.is_empty() && !job.output.exists() {
            tokio::fs::write(job.output, &stdout)
                .await
                .map_err(|e| ThumbnailError::io(job.output, e))?;
        }
        expect_output(Self::NAME, job, job.output)
    }
}
