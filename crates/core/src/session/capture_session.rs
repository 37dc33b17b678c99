use std::sync::{Arc, Mutex};

use crate::capture::domain::frame_capturer::FrameCapturer;
use crate::expression::domain::detection::DetectorOptions;
use crate::expression::domain::expression_scorer::ExpressionScorer;
use crate::expression::domain::expression_scores::DominantExpression;
use crate::readiness::domain::model_loader::ModelLoadError;

use super::capture_job::{CaptureJob, SharedCapturer, SharedScorer};
use super::session_error::{ErrorKind, SessionError};
use super::session_state::{SessionState, SessionView};

/// Drives [`SessionState`] against a camera and an expression scorer.
///
/// The scorer only exists once the readiness gate has succeeded; until then
/// every capture request is a no-op.
pub struct CaptureSession {
    state: SessionState,
    capturer: SharedCapturer,
    scorer: Option<SharedScorer>,
    options: DetectorOptions,
}

impl CaptureSession {
    pub fn new(capturer: Box<dyn FrameCapturer>, options: DetectorOptions) -> Self {
        Self {
            state: SessionState::new(),
            capturer: Arc::new(Mutex::new(capturer)),
            scorer: None,
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionView {
        self.state.view()
    }

    /// The camera, shared with anything that wants live preview frames.
    pub fn capturer(&self) -> SharedCapturer {
        Arc::clone(&self.capturer)
    }

    /// Installs the scorer and enables capture.
    pub fn set_ready(&mut self, scorer: Box<dyn ExpressionScorer>) {
        self.scorer = Some(Arc::new(Mutex::new(scorer)));
        self.state.set_ready();
    }

    pub fn set_init_error(&mut self, detail: impl Into<String>) {
        self.scorer = None;
        self.state
            .set_init_error(SessionError::with_detail(ErrorKind::ModelLoadFailed, detail));
    }

    /// Applies the readiness gate's single outcome.
    pub fn settle_readiness(
        &mut self,
        outcome: Result<Box<dyn ExpressionScorer>, ModelLoadError>,
    ) {
        match outcome {
            Ok(scorer) => self.set_ready(scorer),
            Err(e) => {
                log::error!("Model loading failed: {e}");
                self.set_init_error(e.to_string());
            }
        }
    }

    /// Starts a capture if one is allowed, returning the work to run.
    /// Returns `None` while not ready or while a capture is in flight.
    pub fn request_capture(&mut self) -> Option<CaptureJob> {
        let scorer = self.scorer.as_ref().map(Arc::clone)?;
        if !self.state.begin_capture() {
            return None;
        }
        Some(CaptureJob::new(self.capturer(), scorer, self.options))
    }

    pub fn finish_capture(&mut self, outcome: Result<DominantExpression, SessionError>) {
        self.state.complete_capture(outcome);
    }

    /// Request, run and commit a capture in one call. Returns `false` if the
    /// request was ignored.
    pub async fn capture(&mut self) -> bool {
        let Some(job) = self.request_capture() else {
            return false;
        };
        let outcome = job.run().await;
        self.finish_capture(outcome);
        true
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::still_image::StillImage;
    use crate::expression::domain::detection::{Detection, FaceBox};
    use crate::expression::domain::expression_label::ExpressionLabel;
    use crate::expression::domain::expression_scores::ExpressionScores;
    use crate::readiness::domain::model_loader::ModelArtifact;
    use crate::shared::frame::Frame;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubCapturer {
        active: bool,
        still: Option<StillImage>,
    }

    impl FrameCapturer for StubCapturer {
        fn has_active_stream(&self) -> bool {
            self.active
        }

        fn still_frame(&mut self) -> Option<StillImage> {
            self.still.clone()
        }
    }

    enum Reply {
        Face(Vec<(ExpressionLabel, f32)>),
        NoFace,
        Error,
        PanicThenFace(Vec<(ExpressionLabel, f32)>),
    }

    struct StubScorer {
        reply: Reply,
        calls: Arc<AtomicUsize>,
    }

    impl ExpressionScorer for StubScorer {
        fn detect_single_face(
            &mut self,
            _frame: &Frame,
            _options: &DetectorOptions,
        ) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Face(scores) => face(scores),
                Reply::NoFace => Ok(None),
                Reply::Error => Err("inference backend crashed".into()),
                Reply::PanicThenFace(scores) => {
                    if call == 0 {
                        panic!("inference backend panicked");
                    }
                    face(scores)
                }
            }
        }
    }

    fn face(
        scores: &[(ExpressionLabel, f32)],
    ) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        Ok(Some(Detection {
            face: FaceBox {
                x: 0,
                y: 0,
                width: 8,
                height: 8,
            },
            score: 0.9,
            expressions: ExpressionScores::new(scores.to_vec())?,
        }))
    }

    fn jpeg_still() -> StillImage {
        StillImage::encode_jpeg(&Frame::new(vec![128u8; 16 * 16 * 3], 16, 16)).unwrap()
    }

    fn camera(active: bool, still: Option<StillImage>) -> Box<dyn FrameCapturer> {
        Box::new(StubCapturer { active, still })
    }

    fn happy_scores() -> Vec<(ExpressionLabel, f32)> {
        vec![
            (ExpressionLabel::Happy, 0.8),
            (ExpressionLabel::Neutral, 0.1),
            (ExpressionLabel::Sad, 0.1),
        ]
    }

    fn ready_session(
        capturer: Box<dyn FrameCapturer>,
        reply: Reply,
    ) -> (CaptureSession, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut session = CaptureSession::new(capturer, DetectorOptions::default());
        session.set_ready(Box::new(StubScorer {
            reply,
            calls: Arc::clone(&calls),
        }));
        (session, calls)
    }

    fn failed_kind(session: &CaptureSession) -> Option<ErrorKind> {
        session.state().error().map(SessionError::kind)
    }

    #[tokio::test]
    async fn test_capture_happy_face() {
        let (mut session, calls) =
            ready_session(camera(true, Some(jpeg_still())), Reply::Face(happy_scores()));

        assert!(session.capture().await);

        assert_eq!(session.state().captured_label(), Some(ExpressionLabel::Happy));
        assert_eq!(session.state().captured_label().map(|l| l.glyph()), Some("😊"));
        assert!(!session.state().show_live());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_face_fails_and_keeps_live() {
        let (mut session, _) = ready_session(camera(true, Some(jpeg_still())), Reply::NoFace);

        session.capture().await;

        assert_eq!(failed_kind(&session), Some(ErrorKind::NoFaceDetected));
        assert!(session.state().show_live());
    }

    #[tokio::test]
    async fn test_inactive_stream_is_camera_not_ready() {
        let (mut session, calls) =
            ready_session(camera(false, Some(jpeg_still())), Reply::Face(happy_scores()));

        session.capture().await;

        assert_eq!(failed_kind(&session), Some(ErrorKind::CameraNotReady));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_still_is_capture_failed() {
        let (mut session, _) = ready_session(camera(true, None), Reply::Face(happy_scores()));

        session.capture().await;

        assert_eq!(failed_kind(&session), Some(ErrorKind::CaptureFailed));
    }

    #[tokio::test]
    async fn test_corrupt_still_is_decode_failed() {
        let corrupt = StillImage::new(b"\xff\xd8 truncated".to_vec());
        let (mut session, calls) =
            ready_session(camera(true, Some(corrupt)), Reply::Face(happy_scores()));

        session.capture().await;

        assert_eq!(failed_kind(&session), Some(ErrorKind::DecodeFailed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_still_is_decode_failed() {
        let (mut session, _) =
            ready_session(camera(true, Some(StillImage::new(Vec::new()))), Reply::NoFace);

        session.capture().await;

        assert_eq!(failed_kind(&session), Some(ErrorKind::DecodeFailed));
    }

    #[tokio::test]
    async fn test_scorer_error_is_scoring_failed() {
        let (mut session, _) = ready_session(camera(true, Some(jpeg_still())), Reply::Error);

        session.capture().await;

        let err = session.state().error().unwrap();
        assert_eq!(err.kind(), ErrorKind::ScoringFailed);
        assert_eq!(err.detail(), Some("inference backend crashed"));
    }

    #[tokio::test]
    async fn test_second_request_while_in_flight_is_ignored() {
        let (mut session, calls) =
            ready_session(camera(true, Some(jpeg_still())), Reply::Face(happy_scores()));

        let job = session.request_capture().unwrap();
        let before = session.state().clone();
        assert!(session.request_capture().is_none());
        assert_eq!(session.state(), &before);

        let outcome = job.run().await;
        session.finish_capture(outcome);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state().captured_label(), Some(ExpressionLabel::Happy));
    }

    #[tokio::test]
    async fn test_capture_before_ready_is_noop() {
        let mut session =
            CaptureSession::new(camera(true, Some(jpeg_still())), DetectorOptions::default());

        assert!(!session.capture().await);
        assert_eq!(session.view(), SessionView::Loading);
    }

    #[tokio::test]
    async fn test_failed_readiness_blocks_capture() {
        let mut session =
            CaptureSession::new(camera(true, Some(jpeg_still())), DetectorOptions::default());

        session.settle_readiness(Err(ModelLoadError::Resolve {
            artifact: ModelArtifact::ExpressionClassifier,
            message: "404".into(),
        }));

        assert!(!session.state().is_ready());
        assert_eq!(failed_kind(&session), Some(ErrorKind::ModelLoadFailed));
        assert!(matches!(session.view(), SessionView::InitFailed(_)));
        assert!(session.request_capture().is_none());
    }

    #[tokio::test]
    async fn test_successful_readiness_enables_capture() {
        let mut session =
            CaptureSession::new(camera(true, Some(jpeg_still())), DetectorOptions::default());

        session.settle_readiness(Ok(Box::new(StubScorer {
            reply: Reply::NoFace,
            calls: Arc::new(AtomicUsize::new(0)),
        })));

        assert!(session.state().is_ready());
        assert_eq!(session.view(), SessionView::Live { analyzing: false });
    }

    #[tokio::test]
    async fn test_reset_after_result() {
        let (mut session, _) =
            ready_session(camera(true, Some(jpeg_still())), Reply::Face(happy_scores()));
        session.capture().await;

        session.reset();

        assert!(session.state().show_live());
        assert!(session.state().captured_label().is_none());
        assert!(session.state().error().is_none());
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let (mut session, _) = ready_session(camera(true, None), Reply::Face(happy_scores()));
        session.capture().await;
        assert_eq!(failed_kind(&session), Some(ErrorKind::CaptureFailed));

        if let Ok(mut capturer) = session.capturer().lock() {
            *capturer = camera(true, Some(jpeg_still()));
        }
        session.capture().await;

        assert!(session.state().error().is_none());
        assert_eq!(session.state().captured_label(), Some(ExpressionLabel::Happy));
    }

    #[tokio::test]
    async fn test_capture_recovers_after_scorer_panic() {
        let (mut session, calls) = ready_session(
            camera(true, Some(jpeg_still())),
            Reply::PanicThenFace(happy_scores()),
        );

        assert!(session.capture().await);
        assert_eq!(failed_kind(&session), Some(ErrorKind::ScoringFailed));

        session.reset();
        assert!(session.capture().await);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            session.state().captured_label(),
            Some(ExpressionLabel::Happy)
        );
    }
}
