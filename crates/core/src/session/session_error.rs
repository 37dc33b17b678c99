use thiserror::Error;

/// What went wrong, without the diagnostic detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ModelLoadFailed,
    CameraNotReady,
    CaptureFailed,
    DecodeFailed,
    NoFaceDetected,
    ScoringFailed,
}

impl ErrorKind {
    /// The message shown to the user for this kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::ModelLoadFailed => {
                "Failed to load the expression models. Please reload the application."
            }
            ErrorKind::CameraNotReady => "Camera is not ready yet. Wait a moment or reload.",
            ErrorKind::CaptureFailed => "Could not capture a photo. Please try again.",
            ErrorKind::DecodeFailed => "Could not read the captured photo. Please try again.",
            ErrorKind::NoFaceDetected => "No face detected. Face the camera and try again.",
            ErrorKind::ScoringFailed => "Expression analysis failed. Please try again.",
        }
    }
}

/// A failure recorded in the session.
///
/// `Display` is the user-facing message; `detail` keeps the underlying cause
/// for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .kind.message())]
pub struct SessionError {
    kind: ErrorKind,
    detail: Option<String>,
}

impl SessionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<ErrorKind> for SessionError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
