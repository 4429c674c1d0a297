//! Office documents: LibreOffice converts to PDF, then the first page is rendered.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::error::{ThumbnailError, ThumbnailResult};

use super::pdf::PdfGenerator;
use super::tool::tool;
use super::{Generator, GeneratorJob, MimeMatcher, ToolCommand};

/// Mime fragments LibreOffice can open.
const MIMES: MimeMatcher = MimeMatcher::new(
    &[
        // OpenDocument (.odt, .ods, .odp, ...) and OOXML (.docx, .xlsx, .pptx)
        "application/vnd.oasis.opendocument",
        "application/vnd.openxmlformats-officedocument",
        "application/rtf",
        "text/plain",
        "text/csv",
        // Legacy suites
        "application/vnd.sun.xml",
        "application/vnd.lotus-wordpro",
        "application/wordperfect",
        "application/x-staroffice",
        "application/msword",
        "application/vnd.ms-word",
        "application/vnd.ms-excel",
        "application/vnd.ms-powerpoint",
    ],
    &[],
);

/// Two-step conversion: office file → PDF → PNG.
pub struct DocumentGenerator {
    office: ToolCommand,
    pdf: PdfGenerator,
}

impl DocumentGenerator {
    pub const NAME: &'static str = "document";

    pub fn new(office: ToolCommand, pdf: PdfGenerator) -> Self {
        Self { office, pdf }
    }

    /// A private profile per run lets several conversions run side by side.
    pub fn default_tool() -> ToolConfig {
        tool(
            "libreoffice",
            &[
                "--headless",
                "--norestore",
                "-env:UserInstallation=file://{output_dir}/lo-profile",
                "--convert-to",
                "pdf",
                "--outdir",
                "{output_dir}",
                "{input}",
            ],
        )
    }
}

#[async_trait]
impl Generator for DocumentGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_supported(&self, mime: &str) -> bool {
        MIMES.matches(mime)
    }

    async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
        self.office.run(Self::NAME, job).await?;

        // LibreOffice names the PDF after the source file
        let mut pdf_name = job.source.file_stem().unwrap_or_default().to_os_string();
        pdf_name.push(".pdf");
        let pdf_path = job.output_dir().join(pdf_name);
        if !pdf_path.is_file() {
            return Err(ThumbnailError::GeneratorToolFailure {
                generator: Self::NAME.to_string(),
                path: job.source.to_path_buf(),
                message: format!("{} produced no PDF", self.office.program()),
            });
        }

        let pdf_job = GeneratorJob {
            source: &pdf_path,
            mime: "application/pdf",
            ..*job
        };
        self.pdf.render(Self::NAME, &pdf_job).await
    }
}
