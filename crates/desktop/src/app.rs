use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};

use moodsnap_core::capture::infrastructure::ffmpeg_camera_capturer::FfmpegCameraCapturer;
use moodsnap_core::expression::domain::expression_scorer::ExpressionScorer;
use moodsnap_core::expression::domain::expression_scores::DominantExpression;
use moodsnap_core::expression::infrastructure::onnx_expression_scorer::OnnxExpressionScorer;
use moodsnap_core::readiness::domain::model_loader::{ModelArtifact, ModelLoadError};
use moodsnap_core::readiness::domain::readiness_gate::ReadinessGate;
use moodsnap_core::readiness::infrastructure::onnx_model_loader::{ModelSource, OnnxModelLoader};
use moodsnap_core::session::capture_job::SharedCapturer;
use moodsnap_core::session::capture_session::CaptureSession;
use moodsnap_core::session::session_error::SessionError;
use moodsnap_core::shared::config::AppConfig;

use crate::theme;
use crate::views::{self, ViewContext};

const PREVIEW_INTERVAL: Duration = Duration::from_millis(100);
const THEME_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Latest download progress: `(artifact, downloaded, total)`.
pub type DownloadProgress = Arc<Mutex<Option<(ModelArtifact, u64, u64)>>>;

/// Carries the loaded scorer through a `Message`, which must be `Clone`.
#[derive(Clone)]
pub struct ScorerHandoff(Arc<Mutex<Option<Box<dyn ExpressionScorer>>>>);

impl ScorerHandoff {
    fn new(scorer: Box<dyn ExpressionScorer>) -> Self {
        Self(Arc::new(Mutex::new(Some(scorer))))
    }

    fn take(&self) -> Option<Box<dyn ExpressionScorer>> {
        self.0.lock().ok()?.take()
    }
}

impl std::fmt::Debug for ScorerHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScorerHandoff")
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    ModelsSettled(Result<ScorerHandoff, ModelLoadError>),
    PreviewTick,
    PreviewFetched(Option<image::Handle>),
    Capture,
    CaptureFinished(Result<DominantExpression, SessionError>),
    Reset,
    CaptureHovered(bool),
    PollSystemTheme,
}

pub struct App {
    session: CaptureSession,
    preview: Option<image::Handle>,
    preview_pending: bool,
    download: DownloadProgress,
    capture_hovered: bool,
    dark: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();
        let capturer = FfmpegCameraCapturer::open_or_inactive(config.camera_device.as_deref());
        let download: DownloadProgress = Arc::new(Mutex::new(None));

        let app = Self {
            session: CaptureSession::new(Box::new(capturer), config.detector),
            preview: None,
            preview_pending: false,
            download: Arc::clone(&download),
            capture_hovered: false,
            dark: theme::detect_system_dark_mode(),
        };
        log::info!("Loading models from {}", config.model_source);
        let gate = Task::perform(
            load_scorer(config.model_source, download),
            Message::ModelsSettled,
        );
        (app, gate)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ModelsSettled(outcome) => {
                let outcome = outcome.and_then(|handoff| {
                    handoff
                        .take()
                        .ok_or_else(|| ModelLoadError::Aborted("scorer already taken".into()))
                });
                self.session.settle_readiness(outcome);
            }
            Message::PreviewTick => {
                let state = self.session.state();
                let wants_preview =
                    state.is_ready() && state.show_live() && !state.is_analyzing();
                if wants_preview && !self.preview_pending {
                    self.preview_pending = true;
                    return Task::perform(
                        fetch_preview(self.session.capturer()),
                        Message::PreviewFetched,
                    );
                }
            }
            Message::PreviewFetched(handle) => {
                self.preview_pending = false;
                if handle.is_some() {
                    self.preview = handle;
                }
            }
            Message::Capture => {
                if let Some(job) = self.session.request_capture() {
                    return Task::perform(job.run(), Message::CaptureFinished);
                }
            }
            Message::CaptureFinished(outcome) => {
                self.session.finish_capture(outcome);
            }
            Message::Reset => {
                self.session.reset();
            }
            Message::CaptureHovered(hovered) => {
                self.capture_hovered = hovered;
            }
            Message::PollSystemTheme => {
                let dark = theme::detect_system_dark_mode();
                if dark != self.dark {
                    log::debug!("System appearance changed (dark: {dark})");
                    self.dark = dark;
                }
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let theme = self.theme();
        let ctx = ViewContext {
            preview: self.preview.clone(),
            capture_hovered: self.capture_hovered,
            download: self.download.lock().ok().and_then(|p| *p),
            theme: &theme,
        };
        let content = views::view(self.session.view(), &ctx);

        container(
            column![text("MoodSnap").size(22.0), content]
                .spacing(16)
                .align_x(Alignment::Center)
                .max_width(640.0),
        )
        .padding(24)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.dark)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(PREVIEW_INTERVAL).map(|_| Message::PreviewTick),
            iced::time::every(THEME_POLL_INTERVAL).map(|_| Message::PollSystemTheme),
        ])
    }
}

async fn load_scorer(
    model_source: String,
    download: DownloadProgress,
) -> Result<ScorerHandoff, ModelLoadError> {
    let loader = OnnxModelLoader::new(ModelSource::parse(&model_source)).with_progress(Arc::new(
        move |artifact: ModelArtifact, done: u64, total: u64| {
            if let Ok(mut progress) = download.lock() {
                *progress = Some((artifact, done, total));
            }
        },
    ));
    let models = ReadinessGate::new(loader).open().await?;
    Ok(ScorerHandoff::new(Box::new(
        OnnxExpressionScorer::from_models(models),
    )))
}

/// Grabs a preview frame off the async thread. Skips the tick if a capture
/// currently holds the camera.
async fn fetch_preview(capturer: SharedCapturer) -> Option<image::Handle> {
    tokio::task::spawn_blocking(move || {
        let mut camera = capturer.try_lock().ok()?;
        let frame = camera.preview_frame()?;
        Some(image::Handle::from_rgba(
            frame.width(),
            frame.height(),
            frame.to_rgba(),
        ))
    })
    .await
    .ok()
    .flatten()
}
