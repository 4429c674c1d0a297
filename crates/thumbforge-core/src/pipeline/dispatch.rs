//! Picking a generator for a request and running it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{GeneratorFailure, ThumbnailError, ThumbnailResult};
use crate::generator::{Generator, GeneratorJob, GeneratorRegistry};
use crate::types::ConversionRequest;

/// One generator run and how it ended.
#[derive(Debug)]
pub struct Attempt {
    pub generator: String,
    pub result: ThumbnailResult<PathBuf>,
}

/// A successful dispatch.
#[derive(Debug)]
pub struct Dispatched {
    /// Generator whose output will be processed
    pub generator: String,
    /// Raster written by that generator (or the source itself)
    pub intermediate: PathBuf,
    /// Failed attempts before the successful one, in order
    pub failed: Vec<Attempt>,
}

/// Selects and runs generators from a shared registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<GeneratorRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<GeneratorRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Fail early if the request names a generator that does not exist.
    pub fn check_hint(&self, request: &ConversionRequest) -> ThumbnailResult<()> {
        if request.is_auto() || self.registry.get(&request.generator_hint).is_some() {
            Ok(())
        } else {
            Err(ThumbnailError::UnknownGenerator(request.generator_hint.clone()))
        }
    }

    /// Produce an intermediate raster for `request` inside `scratch`.
    ///
    /// With an explicit hint only that generator runs and its error is
    /// returned as is. In auto mode every claiming generator is tried in
    /// registry order until one succeeds.
    pub async fn select_and_convert(
        &self,
        request: &ConversionRequest,
        mime: &str,
        scratch: &Path,
    ) -> ThumbnailResult<Dispatched> {
        if !request.is_auto() {
            let generator = self
                .registry
                .get(&request.generator_hint)
                .ok_or_else(|| ThumbnailError::UnknownGenerator(request.generator_hint.clone()))?;
            let intermediate = Self::attempt(generator, request, mime, scratch).await?;
            return Ok(Dispatched {
                generator: generator.name().to_string(),
                intermediate,
                failed: Vec::new(),
            });
        }

        let mut failed = Vec::new();
        for generator in self.registry.supporting(mime) {
            match Self::attempt(generator, request, mime, scratch).await {
                Ok(intermediate) => {
                    tracing::debug!(
                        generator = generator.name(),
                        intermediate = %intermediate.display(),
                        "Generator succeeded"
                    );
                    return Ok(Dispatched {
                        generator: generator.name().to_string(),
                        intermediate,
                        failed,
                    });
                }
                Err(e) => {
                    tracing::warn!(generator = generator.name(), "Generator failed, trying next: {e}");
                    failed.push(Attempt {
                        generator: generator.name().to_string(),
                        result: Err(e),
                    });
                }
            }
        }

        Err(ThumbnailError::NoSupportedGenerator {
            mime: mime.to_string(),
            failures: failed
                .into_iter()
                .filter_map(|a| {
                    a.result.err().map(|e| GeneratorFailure {
                        generator: a.generator,
                        message: e.to_string(),
                    })
                })
                .collect(),
        })
    }

    async fn attempt(
        generator: &dyn Generator,
        request: &ConversionRequest,
        mime: &str,
        scratch: &Path,
    ) -> ThumbnailResult<PathBuf> {
        // One file per generator so a failed run leaves nothing for the next one to trip over
        let output = scratch.join(format!("{}.png", generator.name()));
        let job = GeneratorJob {
            source: &request.source_path,
            mime,
            output: &output,
            width: request.width,
            height: request.height,
            quality: request.quality,
        };
        tracing::debug!(generator = generator.name(), mime, "Running generator");
        generator.convert(&job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Claims mimes containing `pattern`; succeeds or fails on demand.
    struct FakeGenerator {
        name: &'static str,
        pattern: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeGenerator {
        fn boxed(
            name: &'static str,
            pattern: &'static str,
            succeed: bool,
        ) -> (Box<dyn Generator>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let gen = FakeGenerator {
                name,
                pattern,
                succeed,
                calls: calls.clone(),
            };
            (Box::new(gen), calls)
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        fn name(&self) -> &str {
            self.name
        }

        fn is_supported(&self, mime: &str) -> bool {
            mime.contains(self.pattern)
        }

        async fn convert(&self, job: &GeneratorJob<'_>) -> ThumbnailResult<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(job.output.to_path_buf())
            } else {
                Err(ThumbnailError::GeneratorToolFailure {
                    generator: self.name.to_string(),
                    path: job.source.to_path_buf(),
                    message: "tool missing".to_string(),
                })
            }
        }
    }

    fn dispatcher(generators: Vec<Box<dyn Generator>>) -> Dispatcher {
        Dispatcher::new(Arc::new(GeneratorRegistry::from_generators(generators).unwrap()))
    }

    fn request() -> ConversionRequest {
        ConversionRequest::new("/in/file.bin", "/out/thumb.webp")
    }

    #[tokio::test]
    async fn test_first_registered_match_wins() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", true);
        let (b, b_calls) = FakeGenerator::boxed("b", "video", true);
        let d = dispatcher(vec![a, b]);

        let out = d
            .select_and_convert(&request(), "video/mp4", Path::new("/scratch"))
            .await
            .unwrap();
        assert_eq!(out.generator, "a");
        assert_eq!(out.intermediate, Path::new("/scratch/a.png"));
        assert!(out.failed.is_empty());
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_through_to_next_candidate() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", false);
        let (skip, skip_calls) = FakeGenerator::boxed("skip", "audio", true);
        let (b, b_calls) = FakeGenerator::boxed("b", "video", true);
        let d = dispatcher(vec![a, skip, b]);

        let out = d
            .select_and_convert(&request(), "video/mp4", Path::new("/scratch"))
            .await
            .unwrap();
        assert_eq!(out.generator, "b");
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].generator, "a");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(skip_calls.load(Ordering::SeqCst), 0);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", false);
        let (b, b_calls) = FakeGenerator::boxed("b", "video", false);
        let d = dispatcher(vec![a, b]);

        let err = d
            .select_and_convert(&request(), "video/mp4", Path::new("/scratch"))
            .await
            .unwrap_err();
        match err {
            ThumbnailError::NoSupportedGenerator { mime, failures } => {
                assert_eq!(mime, "video/mp4");
                let names: Vec<&str> = failures.iter().map(|f| f.generator.as_str()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // each candidate ran exactly once
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nothing_claims_mime() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", true);
        let d = dispatcher(vec![a]);

        let err = d
            .select_and_convert(&request(), "application/x-nothing", Path::new("/scratch"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ThumbnailError::NoSupportedGenerator { ref failures, .. } if failures.is_empty()
        ));
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_hint_runs_only_that_generator() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", true);
        let (b, b_calls) = FakeGenerator::boxed("b", "pdf", true);
        let d = dispatcher(vec![a, b]);

        // b does not even claim the mime; an explicit hint skips matching
        let out = d
            .select_and_convert(&request().generator("b"), "video/mp4", Path::new("/scratch"))
            .await
            .unwrap();
        assert_eq!(out.generator, "b");
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_hint_failure_does_not_fall_through() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", false);
        let (b, b_calls) = FakeGenerator::boxed("b", "video", true);
        let d = dispatcher(vec![a, b]);

        let err = d
            .select_and_convert(&request().generator("a"), "video/mp4", Path::new("/scratch"))
            .await
            .unwrap_err();
        assert!(matches!(err, ThumbnailError::GeneratorToolFailure { .. }));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_hint_skips_auto_matching() {
        let (a, a_calls) = FakeGenerator::boxed("a", "video", true);
        let d = dispatcher(vec![a]);
        let req = request().generator("nope");

        assert!(matches!(d.check_hint(&req), Err(ThumbnailError::UnknownGenerator(_))));
        let err = d
            .select_and_convert(&req, "video/mp4", Path::new("/scratch"))
            .await
            .unwrap_err();
        assert!(matches!(err, ThumbnailError::UnknownGenerator(ref name) if name == "nope"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }
}
