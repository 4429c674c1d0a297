//! Running external converter tools with argument templates and a timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ToolConfig;
use crate::error::{ThumbnailError, ThumbnailResult};

use super::GeneratorJob;

/// Stderr is cut to this many bytes in error messages.
const MAX_STDERR: usize = 512;

/// An external program plus its argument template.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Build from a tool config and a per-invocation timeout.
    pub fn new(tool: ToolConfig, timeout: Duration) -> Self {
        Self {
            program: tool.program,
            args: tool.args,
            timeout,
        }
    }

    /// Use `custom` if given, else the generator's built-in tool.
    pub fn resolve(default: ToolConfig, custom: Option<ToolConfig>, timeout: Duration) -> Self {
        Self::new(custom.unwrap_or(default), timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Substitute job placeholders into the argument template.
    pub fn expand_args(&self, job: &GeneratorJob<'_>) -> Vec<String> {
        let input = job.source.to_string_lossy();
        let output = job.output.to_string_lossy();
        let output_dir = job.output_dir().to_string_lossy();
        let output_stem = job.output.with_extension("");
        let output_stem = output_stem.to_string_lossy();
        let width = job.width.to_string();
        let height = job.height.to_string();
        let quality = job.quality.to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output_dir}", &output_dir)
                    .replace("{output_stem}", &output_stem)
                    .replace("{output}", &output)
                    .replace("{width}", &width)
                    .replace("{height}", &height)
                    .replace("{quality}", &quality)
            })
            .collect()
    }

    /// Run the tool for a job and return its stdout.
    ///
    /// A non-zero exit, a spawn failure or a timeout is an error; on timeout
    /// the child is killed.
    pub async fn run(&self, generator: &str, job: &GeneratorJob<'_>) -> ThumbnailResult<Vec<u8>> {
        let args = self.expand_args(job);
        tracing::debug!(generator, program = %self.program, ?args, "Running external tool");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(failure(
                    generator,
                    job.source,
                    format!("cannot run {}: {}", self.program, e),
                ))
            }
            Err(_) => {
                return Err(ThumbnailError::Timeout {
                    program: self.program.clone(),
                    path: job.source.to_path_buf(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let stderr = match stderr.char_indices().nth(MAX_STDERR) {
                Some((idx, _)) => &stderr[..idx],
                None => stderr,
            };
            return Err(failure(
                generator,
                job.source,
                format!("{} exited with {}: {}", self.program, output.status, stderr),
            ));
        }

        Ok(output.stdout)
    }
}

fn failure(generator: &str, source: &Path, message: String) -> ThumbnailError {
    ThumbnailError::GeneratorToolFailure {
        generator: generator.to_string(),
        path: source.to_path_buf(),
        message,
    }
}

/// Shorthand for built-in tool definitions.
pub(crate) fn tool(program: &str, args: &[&str]) -> ToolConfig {
    ToolConfig {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn job<'a>(source: &'a Path, output: &'a Path) -> GeneratorJob<'a> {
        GeneratorJob {
            source,
            mime: "video/mp4",
            output,
            width: 320,
            height: 240,
            quality: 80,
        }
    }

    #[test]
    fn test_expand_args() {
        let cmd = ToolCommand::new(
            tool(
                "conv",
                &[
                    "{input}",
                    "--out={output}",
                    "{output_dir}",
                    "{output_stem}",
                    "{width}x{height}",
                    "-q{quality}",
                ],
            ),
            Duration::from_secs(1),
        );
        let source = PathBuf::from("/data/in.mp4");
        let output = PathBuf::from("/scratch/video.png");
        let args = cmd.expand_args(&job(&source, &output));
        assert_eq!(
            args,
            vec![
                "/data/in.mp4",
                "--out=/scratch/video.png",
                "/scratch",
                "/scratch/video",
                "320x240",
                "-q80",
            ]
        );
    }

    #[test]
    fn test_resolve_prefers_custom() {
        let cmd = ToolCommand::resolve(
            tool("ffmpeg", &[]),
            Some(tool("/opt/ffmpeg", &[])),
            Duration::from_secs(1),
        );
        assert_eq!(cmd.program(), "/opt/ffmpeg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_returns_stdout() {
        let cmd = ToolCommand::new(tool("sh", &["-c", "printf '%s' {width}"]), Duration::from_secs(5));
        let (source, output) = (PathBuf::from("in"), PathBuf::from("out.png"));
        let stdout = cmd.run("test", &job(&source, &output)).await.unwrap();
        assert_eq!(stdout, b"320");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_nonzero_exit() {
        let cmd = ToolCommand::new(
            tool("sh", &["-c", "echo broken input >&2; exit 3"]),
            Duration::from_secs(5),
        );
        let (source, output) = (PathBuf::from("in"), PathBuf::from("out.png"));
        let err = cmd.run("test", &job(&source, &output)).await.unwrap_err();
        match err {
            ThumbnailError::GeneratorToolFailure { generator, message, .. } => {
                assert_eq!(generator, "test");
                assert!(message.contains("broken input"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let cmd = ToolCommand::new(
            tool("thumbforge-definitely-missing-tool", &[]),
            Duration::from_secs(5),
        );
        let (source, output) = (PathBuf::from("in"), PathBuf::from("out.png"));
        let err = cmd.run("test", &job(&source, &output)).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::GeneratorToolFailure { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let cmd = ToolCommand::new(tool("sleep", &["5"]), Duration::from_millis(100));
        let (source, output) = (PathBuf::from("in"), PathBuf::from("out.png"));
        let err = cmd.run("test", &job(&source, &output)).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::Timeout { timeout_ms: 100, .. }));
    }
}
