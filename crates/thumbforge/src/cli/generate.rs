//! The `thumbforge generate` command.

use clap::Args;
use std::path::PathBuf;
use thumbforge_core::{Anchor, Config, ConversionRequest, Mode, Thumbforge};

/// Arguments for the `generate` command.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// File to make a thumbnail of
    #[arg(required = true)]
    pub source: PathBuf,

    /// Where to write the thumbnail
    #[arg(required = true)]
    pub destination: PathBuf,

    /// Source mime type (sniffed from the file when omitted)
    #[arg(long)]
    pub mime: Option<String>,

    /// Output mime type, e.g. image/webp, image/png, image/jpeg
    #[arg(short, long)]
    pub format: Option<String>,

    /// Box width in pixels
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Box height in pixels
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Encoder quality (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// How to fit the box: crop, bestfit or canvas
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Which part survives a crop, e.g. center, top-left
    #[arg(long)]
    pub anchor: Option<Anchor>,

    /// Generator to use instead of picking by mime type
    #[arg(short, long, default_value = thumbforge_core::AUTO_GENERATOR)]
    pub generator: String,

    /// Fail instead of replacing an existing thumbnail
    #[arg(long)]
    pub no_overwrite: bool,

    /// Print a JSON report to stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let thumbforge = Thumbforge::new(config);
    let request = build_request(&thumbforge, &args);

    tracing::debug!(
        generator = %request.generator_hint,
        mode = %request.mode,
        "Generating {}x{} {}",
        request.width,
        request.height,
        request.destination_mime
    );

    let report = match thumbforge.try_run(&request).await {
        Ok(report) => report,
        Err(e) => anyhow::bail!("Failed to generate thumbnail for {}: {e}", args.source.display()),
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.destination.display());
    }

    tracing::info!(
        generator = %report.generator,
        "Wrote {} ({}x{})",
        report.destination.display(),
        report.width,
        report.height
    );
    Ok(())
}

/// Config defaults overridden by whatever was given on the command line.
fn build_request(thumbforge: &Thumbforge, args: &GenerateArgs) -> ConversionRequest {
    let mut request = thumbforge
        .request(&args.source, &args.destination)
        .generator(args.generator.clone())
        .overwrite(!args.no_overwrite);

    if let Some(mime) = &args.mime {
        request = request.source_mime(mime.clone());
    }
    if let Some(format) = &args.format {
        request = request.destination_mime(format.clone());
    }
    let width = args.width.unwrap_or(request.width);
    let height = args.height.unwrap_or(request.height);
    request = request.size(width, height);
    if let Some(quality) = args.quality {
        request = request.quality(quality);
    }
    if let Some(mode) = args.mode {
        request = request.mode(mode);
    }
    if let Some(anchor) = args.anchor {
        request = request.anchor(anchor);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(source: &str, destination: &str) -> GenerateArgs {
        GenerateArgs {
            source: source.into(),
            destination: destination.into(),
            generator: thumbforge_core::AUTO_GENERATOR.to_string(),
            ..GenerateArgs::default()
        }
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = Config::default();
        config.thumbnail.width = 256;
        config.thumbnail.quality = 60;
        let thumbforge = Thumbforge::new(config);

        let request = build_request(&thumbforge, &args("a.mp4", "a.webp"));
        assert_eq!((request.width, request.height), (256, 600));
        assert_eq!(request.quality, 60);
        assert!(request.overwrite);
        assert!(request.is_auto());
        assert!(request.source_mime.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let thumbforge = Thumbforge::new(Config::default());
        let request = build_request(
            &thumbforge,
            &GenerateArgs {
                mime: Some("application/pdf".into()),
                format: Some("image/png".into()),
                height: Some(100),
                mode: Some(Mode::Canvas),
                anchor: Some(Anchor::TopLeft),
                generator: "pdf".into(),
                no_overwrite: true,
                ..args("a.bin", "a.png")
            },
        );
        assert_eq!(request.source_mime.as_deref(), Some("application/pdf"));
        assert_eq!(request.destination_mime, "image/png");
        assert_eq!((request.width, request.height), (600, 100));
        assert_eq!(request.mode, Mode::Canvas);
        assert_eq!(request.anchor, Anchor::TopLeft);
        assert_eq!(request.generator_hint, "pdf");
        assert!(!request.overwrite);
    }

    #[tokio::test]
    async fn test_execute_fails_for_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out/thumb.webp");
        let result = execute(
            args(
                dir.path().join("missing.mp4").to_str().unwrap(),
                dest.to_str().unwrap(),
            ),
            Config::default(),
        )
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Source not found"), "{err}");
        assert!(!dir.path().join("out").exists());
    }
}
