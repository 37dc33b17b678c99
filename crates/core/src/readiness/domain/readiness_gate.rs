use std::sync::Arc;

use tokio::task::JoinHandle;

use super::model_loader::{LoadedModels, ModelArtifact, ModelLoadError, ModelLoader};

/// Loads both models concurrently and settles exactly once.
///
/// There is no retry: a failed gate stays failed until the application is
/// restarted.
pub struct ReadinessGate<L: ModelLoader> {
    loader: Arc<L>,
}

impl<L: ModelLoader> ReadinessGate<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    pub async fn open(&self) -> Result<LoadedModels<L::Model>, ModelLoadError> {
        log::info!("Loading expression models");
        let detector = self.spawn_load(ModelArtifact::FaceDetector);
        let classifier = self.spawn_load(ModelArtifact::ExpressionClassifier);

        let (face_detector, expression_classifier) =
            tokio::try_join!(settle(detector), settle(classifier))?;

        log::info!("Expression models ready");
        Ok(LoadedModels {
            face_detector,
            expression_classifier,
        })
    }

    fn spawn_load(&self, artifact: ModelArtifact) -> JoinHandle<Result<L::Model, ModelLoadError>> {
        let loader = Arc::clone(&self.loader);
        tokio::task::spawn_blocking(move || {
            let result = loader.load(artifact);
            match &result {
                Ok(_) => log::info!("Loaded {artifact} model"),
                Err(e) => log::error!("{e}"),
            }
            result
        })
    }
}

async fn settle<M>(handle: JoinHandle<Result<M, ModelLoadError>>) -> Result<M, ModelLoadError> {
    handle
        .await
        .map_err(|e| ModelLoadError::Aborted(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Loads a string naming the artifact, failing for `fail_on`.
    struct StubLoader {
        fail_on: Option<ModelArtifact>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl StubLoader {
        fn new(fail_on: Option<ModelArtifact>, delay: Duration) -> Self {
            Self {
                fail_on,
                delay,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ModelLoader for StubLoader {
        type Model = &'static str;

        fn load(&self, artifact: ModelArtifact) -> Result<Self::Model, ModelLoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on == Some(artifact) {
                return Err(ModelLoadError::Resolve {
                    artifact,
                    message: "network unreachable".into(),
                });
            }
            Ok(artifact.file_name())
        }
    }

    #[tokio::test]
    async fn test_both_loads_succeed() {
        let gate = ReadinessGate::new(StubLoader::new(None, Duration::ZERO));

        let models = gate.open().await.unwrap();

        assert_eq!(models.face_detector, ModelArtifact::FaceDetector.file_name());
        assert_eq!(
            models.expression_classifier,
            ModelArtifact::ExpressionClassifier.file_name()
        );
        assert_eq!(gate.loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_loads_run_concurrently() {
        let gate = ReadinessGate::new(StubLoader::new(None, Duration::from_millis(100)));

        gate.open().await.unwrap();

        assert_eq!(gate.loader.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_classifier_failure_fails_gate() {
        let gate = ReadinessGate::new(StubLoader::new(
            Some(ModelArtifact::ExpressionClassifier),
            Duration::ZERO,
        ));

        let err = gate.open().await.unwrap_err();

        assert!(matches!(
            err,
            ModelLoadError::Resolve {
                artifact: ModelArtifact::ExpressionClassifier,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_detector_failure_fails_gate() {
        let gate = ReadinessGate::new(StubLoader::new(
            Some(ModelArtifact::FaceDetector),
            Duration::ZERO,
        ));

        assert!(gate.open().await.is_err());
    }
}
