use crate::expression::domain::expression_label::ExpressionLabel;
use crate::expression::domain::expression_scores::DominantExpression;

use super::session_error::{ErrorKind, SessionError};

/// Where the current capture cycle stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    /// A capture is in flight; further requests are ignored.
    Analyzing,
    Result(DominantExpression),
    Failed(SessionError),
}

/// Exactly one of these is rendered at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    /// Models are still loading.
    Loading,
    /// Model loading failed; only a reload helps.
    InitFailed(SessionError),
    Live { analyzing: bool },
    Result(DominantExpression),
    Failed(SessionError),
}

/// The application's single piece of mutable state.
///
/// Label and error live in the same [`Phase`], so setting one always clears
/// the other, and the live view is shown unless a result is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    ready: bool,
    phase: Phase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            ready: false,
            phase: Phase::Idle,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    pub fn error(&self) -> Option<&SessionError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn captured(&self) -> Option<DominantExpression> {
        match self.phase {
            Phase::Result(dominant) => Some(dominant),
            _ => None,
        }
    }

    pub fn captured_label(&self) -> Option<ExpressionLabel> {
        self.captured().map(|d| d.label)
    }

    pub fn show_live(&self) -> bool {
        !matches!(self.phase, Phase::Result(_))
    }

    pub fn can_capture(&self) -> bool {
        self.ready && !self.is_analyzing()
    }

    /// Marks the models as loaded, clearing a previous load failure.
    pub fn set_ready(&mut self) {
        self.ready = true;
        if self.error().map(SessionError::kind) == Some(ErrorKind::ModelLoadFailed) {
            self.phase = Phase::Idle;
        }
        log::debug!("Session ready");
    }

    pub fn set_init_error(&mut self, error: SessionError) {
        log::debug!("Session init failed: {error}");
        self.ready = false;
        self.phase = Phase::Failed(error);
    }

    /// Enters `Analyzing`. Returns `false`, changing nothing, when capture is
    /// not currently allowed.
    pub fn begin_capture(&mut self) -> bool {
        if !self.can_capture() {
            log::debug!(
                "Ignoring capture request (ready: {}, analyzing: {})",
                self.ready,
                self.is_analyzing()
            );
            return false;
        }
        self.phase = Phase::Analyzing;
        log::debug!("Session analyzing");
        true
    }

    /// Commits the outcome of the in-flight capture. Returns `false` if no
    /// capture was in flight.
    pub fn complete_capture(&mut self, outcome: Result<DominantExpression, SessionError>) -> bool {
        if !self.is_analyzing() {
            log::warn!("Discarding capture outcome with no capture in flight");
            return false;
        }
        self.phase = match outcome {
            Ok(dominant) => {
                log::debug!("Session result: {}", dominant.label);
                Phase::Result(dominant)
            }
            Err(error) => {
                log::debug!("Session failed: {error}");
                Phase::Failed(error)
            }
        };
        true
    }

    /// Back to `Idle`. Ignored while a capture is in flight.
    pub fn reset(&mut self) {
        if self.is_analyzing() {
            log::debug!("Ignoring reset during capture");
            return;
        }
        self.phase = Phase::Idle;
    }

    pub fn view(&self) -> SessionView {
        if !self.ready {
            return match &self.phase {
                Phase::Failed(err) => SessionView::InitFailed(err.clone()),
                _ => SessionView::Loading,
            };
        }
        match &self.phase {
            Phase::Idle => SessionView::Live { analyzing: false },
            Phase::Analyzing => SessionView::Live { analyzing: true },
            Phase::Result(dominant) => SessionView::Result(*dominant),
            Phase::Failed(err) => SessionView::Failed(err.clone()),
        }
    }
}
