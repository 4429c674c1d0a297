//! PDF thumbnails: the first page rendered by pdftoppm.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::ThumbnailResult;

use super::tool::tool;
use super::{expect_output, Generator, GeneratorJob, MimeMatcher, ToolCommand};

const MIMES: MimeMatcher = MimeMatcher::new(&["application/pdf"], &[]);

/// Renders page one of a PDF to PNG.
#[derive(Clone)]
pub struct PdfGenerator {
    tool: ToolCommand,
}

impl PdfGenerator {
    pub const NAME: &'static str = "pdf";

    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }

    /// pdftoppm appends `.png` to the output root itself.
    pub fn default_tool() -> ToolConfig {
        tool(
            "pdftoppm",
            &[
                "-png",
                "-singlefile",
                "-f",
                "1",
                "-l",
                "1",
                "-r",
                "150",
                "{input}",
                "{output_stem}",
            ],
        )
    }

    /// Render a PDF on behalf of `generator` (also used after office conversion).
    pub(crate) async fn render(
        &self,
        generator: &str,
        job: &GeneratorJob<'_>,
    ) -> ThumbnailResult<PathBuf> {
        self.tool.run(generator, job).await?;
        expect_output(generator, job, job.output)
    }
}

#[async_trait]
impl Generator for PdfGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        self.render(Self::NAME, job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_supported_mimes() {
        let gen = PdfGenerator::new(ToolCommand::new(
            PdfGenerator::default_tool(),
            Duration::from_secs(1),
        ));
        assert!(gen.is_supported("application/pdf"));
        assert!(!gen.is_supported("application/postscript"));
    }

    #[test]
    fn test_default_tool_writes_job_output() {
        let cmd = ToolCommand::new(PdfGenerator::default_tool(), Duration::from_secs(1));
        let job = GeneratorJob {
            source: Path::new("/docs/a.pdf"),
            mime: "application/pdf",
            output: Path::new("/scratch/pdf.png"),
            width: 600,
            height: 600,
            quality: 75,
        };
        let args = cmd.expand_args(&job);
        assert_eq!(args.last().map(String::as_str), Some("/scratch/pdf"));
    }
}
