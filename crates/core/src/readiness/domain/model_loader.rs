use thiserror::Error;

use crate::shared::constants::{
    EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL, FACE_DETECTOR_MODEL_NAME,
};

/// The two models that must both load before capture is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelArtifact {
    FaceDetector,
    ExpressionClassifier,
}

impl ModelArtifact {
    pub const ALL: [ModelArtifact; 2] = [
        ModelArtifact::FaceDetector,
        ModelArtifact::ExpressionClassifier,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ModelArtifact::FaceDetector => FACE_DETECTOR_MODEL_NAME,
            ModelArtifact::ExpressionClassifier => EXPRESSION_MODEL_NAME,
        }
    }

    /// Public download location used when no model source is configured.
    pub fn default_url(self) -> Option<&'static str> {
        match self {
            ModelArtifact::FaceDetector => None,
            ModelArtifact::ExpressionClassifier => Some(EXPRESSION_MODEL_URL),
        }
    }
}

impl std::fmt::Display for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelArtifact::FaceDetector => write!(f, "face detector"),
            ModelArtifact::ExpressionClassifier => write!(f, "expression classifier"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    #[error("{artifact} model not found at {path}")]
    Missing { artifact: ModelArtifact, path: String },
    #[error("could not fetch {artifact} model: {message}")]
    Resolve {
        artifact: ModelArtifact,
        message: String,
    },
    #[error("could not initialise {artifact} model: {message}")]
    Session {
        artifact: ModelArtifact,
        message: String,
    },
    #[error("model loading task aborted: {0}")]
    Aborted(String),
}

/// Both models, available only together.
#[derive(Debug)]
pub struct LoadedModels<M> {
    pub face_detector: M,
    pub expression_classifier: M,
}

/// Turns a [`ModelArtifact`] into a usable in-memory model.
///
/// `load` blocks; the readiness gate runs it off the async thread.
pub trait ModelLoader: Send + Sync + 'static {
    type Model: Send + 'static;

    fn load(&self, artifact: ModelArtifact) -> Result<Self::Model, ModelLoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_distinct() {
        assert_ne!(
            ModelArtifact::FaceDetector.file_name(),
            ModelArtifact::ExpressionClassifier.file_name()
        );
    }

    #[test]
    fn test_default_urls_serve_the_named_file() {
        for artifact in ModelArtifact::ALL {
            if let Some(url) = artifact.default_url() {
                assert!(url.starts_with("https://"));
                assert!(url.ends_with(artifact.file_name()));
            }
        }
        assert!(ModelArtifact::FaceDetector.default_url().is_none());
    }

    #[test]
    fn test_error_names_artifact() {
        let err = ModelLoadError::Resolve {
            artifact: ModelArtifact::ExpressionClassifier,
            message: "timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not fetch expression classifier model: timed out"
        );
    }
}
