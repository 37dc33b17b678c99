use std::sync::{Arc, Mutex, PoisonError};

use crate::capture::domain::frame_capturer::FrameCapturer;
use crate::capture::domain::still_image::{decode_still, StillImage};
use crate::expression::domain::detection::{Detection, DetectorOptions};
use crate::expression::domain::expression_scorer::ExpressionScorer;
use crate::expression::domain::expression_scores::{reduce_dominant, DominantExpression};
use crate::shared::frame::Frame;

use super::session_error::{ErrorKind, SessionError};

pub type SharedCapturer = Arc<Mutex<Box<dyn FrameCapturer>>>;
pub type SharedScorer = Arc<Mutex<Box<dyn ExpressionScorer>>>;

/// One capture → score → reduce pass, detached from the session so it can
/// be awaited on another task.
///
/// Blocking steps (camera read, JPEG decode, inference) run on tokio's
/// blocking pool.
pub struct CaptureJob {
    capturer: SharedCapturer,
    scorer: SharedScorer,
    options: DetectorOptions,
}

impl CaptureJob {
    pub(crate) fn new(
        capturer: SharedCapturer,
        scorer: SharedScorer,
        options: DetectorOptions,
    ) -> Self {
        Self {
            capturer,
            scorer,
            options,
        }
    }

    pub async fn run(self) -> Result<DominantExpression, SessionError> {
        let outcome = self.execute().await;
        if let Err(e) = &outcome {
            log::warn!("Capture failed: {e} ({})", e.detail().unwrap_or("no detail"));
        }
        outcome
    }

    async fn execute(self) -> Result<DominantExpression, SessionError> {
        let still = acquire_still(self.capturer).await?;
        let frame = decode(still).await?;
        let detection = score(self.scorer, frame, self.options)
            .await?
            .ok_or_else(|| SessionError::new(ErrorKind::NoFaceDetected))?;

        let dominant = reduce_dominant(&detection.expressions);
        log::info!(
            "Dominant expression {} ({}%)",
            dominant.label,
            dominant.confidence_percent()
        );
        Ok(dominant)
    }
}

async fn acquire_still(capturer: SharedCapturer) -> Result<StillImage, SessionError> {
    tokio::task::spawn_blocking(move || {
        // A panic in an earlier capture leaves the camera usable.
        let mut capturer = capturer.lock().unwrap_or_else(PoisonError::into_inner);
        if !capturer.has_active_stream() {
            return Err(SessionError::new(ErrorKind::CameraNotReady));
        }
        capturer
            .still_frame()
            .ok_or_else(|| SessionError::with_detail(ErrorKind::CaptureFailed, "no still returned"))
    })
    .await
    .map_err(|e| SessionError::with_detail(ErrorKind::CaptureFailed, e.to_string()))?
}

async fn decode(still: StillImage) -> Result<Frame, SessionError> {
    tokio::task::spawn_blocking(move || {
        decode_still(&still)
            .map_err(|e| SessionError::with_detail(ErrorKind::DecodeFailed, e.to_string()))
    })
    .await
    .map_err(|e| SessionError::with_detail(ErrorKind::DecodeFailed, e.to_string()))?
}

async fn score(
    scorer: SharedScorer,
    frame: Frame,
    options: DetectorOptions,
) -> Result<Option<Detection>, SessionError> {
    tokio::task::spawn_blocking(move || {
        let mut scorer = scorer.lock().unwrap_or_else(PoisonError::into_inner);
        scorer
            .detect_single_face(&frame, &options)
            .map_err(|e| SessionError::with_detail(ErrorKind::ScoringFailed, e.to_string()))
    })
    .await
    .map_err(|e| SessionError::with_detail(ErrorKind::ScoringFailed, e.to_string()))?
}
