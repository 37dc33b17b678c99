use std::path::PathBuf;
use std::sync::Arc;

use crate::readiness::domain::model_loader::{ModelArtifact, ModelLoadError, ModelLoader};

use super::execution_provider::build_session;
use super::model_resolver;

/// Download progress: `(artifact, bytes_downloaded, total_bytes)`.
pub type LoadProgressFn = Arc<dyn Fn(ModelArtifact, u64, u64) + Send + Sync>;

/// Where the model artifacts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Cache or bundled directory first, then each artifact's public
    /// download location, if it has one.
    Default,
    /// Base URL; artifacts are cached locally after the first download.
    Remote(String),
    /// Directory that already contains both artifacts.
    Local(PathBuf),
}

impl ModelSource {
    /// Blank selects [`ModelSource::Default`].
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.is_empty() {
            ModelSource::Default
        } else if source.starts_with("http://") || source.starts_with("https://") {
            ModelSource::Remote(source.to_string())
        } else {
            ModelSource::Local(PathBuf::from(source))
        }
    }
}

/// Builds ONNX Runtime sessions for each artifact.
pub struct OnnxModelLoader {
    source: ModelSource,
    bundled_dir: Option<PathBuf>,
    progress: Option<LoadProgressFn>,
}

impl OnnxModelLoader {
    /// Remote artifacts are looked up in [`model_resolver::bundled_models_dir`]
    /// before being downloaded.
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            bundled_dir: model_resolver::bundled_models_dir(),
            progress: None,
        }
    }

    /// Directory checked before downloading a remote artifact.
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    pub fn with_progress(mut self, progress: LoadProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    fn resolve_path(&self, artifact: ModelArtifact) -> Result<PathBuf, ModelLoadError> {
        let name = artifact.file_name();
        match &self.source {
            ModelSource::Local(dir) => {
                let path = dir.join(name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ModelLoadError::Missing {
                        artifact,
                        path: path.display().to_string(),
                    })
                }
            }
            ModelSource::Remote(base_url) => {
                self.fetch(artifact, Some(model_resolver::model_url(base_url, name)))
            }
            ModelSource::Default => self.fetch(artifact, artifact.default_url().map(String::from)),
        }
    }

    fn fetch(&self, artifact: ModelArtifact, url: Option<String>) -> Result<PathBuf, ModelLoadError> {
        let progress = self.progress.clone().map(|cb| {
            Box::new(move |done: u64, total: u64| cb(artifact, done, total))
                as model_resolver::ProgressFn
        });
        model_resolver::resolve(
            artifact.file_name(),
            url.as_deref(),
            self.bundled_dir.as_deref(),
            progress,
        )
        .map_err(|e| ModelLoadError::Resolve {
            artifact,
            message: e.to_string(),
        })
    }
}

impl ModelLoader for OnnxModelLoader {
    type Model = ort::session::Session;

    fn load(&self, artifact: ModelArtifact) -> Result<Self::Model, ModelLoadError> {
        let path = self.resolve_path(artifact)?;
        log::debug!("Building {artifact} session from {}", path.display());
        build_session(&path).map_err(|e| ModelLoadError::Session {
            artifact,
            message: e.to_string(),
        })
    }
}
