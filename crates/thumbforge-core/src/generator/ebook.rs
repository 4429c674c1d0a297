//! Ebooks: the cover image extracted with Calibre's ebook-meta.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["ebook"], &["application/epub+zip"]);

/// Writes the book's cover. Books without a cover fail.
pub struct EbookGenerator {
    tool: ToolCommand,
}

impl EbookGenerator {
    pub const NAME: &'static str = "ebook";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    pub fn default_tool() -> ToolConfig {
        tool("ebook-meta", &["{input}", "--get-cover={output}"])
    }
}

#[async_trait]
impl Generator for EbookGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        // ebook-meta exits 0 even when the book has no cover
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
        let gen = EbookGenerator::new(ToolCommand::new(
            EbookGenerator::default_tool(),
            Duration::from_secs(1),
        ));
        assert!(gen.is_supported("application/epub+zip"));
        assert!(gen.is_supported("application/vnd.amazon.ebook"));
        assert!(gen.is_supported("application/x-mobipocket-ebook"));
        assert!(!gen.is_supported("application/zip"));
    }
}
