mod failed_view;
mod live_view;
mod loading_view;
mod result_view;

use iced::widget::image;
use iced::{Element, Theme};

use moodsnap_core::readiness::domain::model_loader::ModelArtifact;
use moodsnap_core::session::session_state::SessionView;

use crate::app::Message;

/// Everything a view needs besides the session itself.
pub struct ViewContext<'a> {
    pub preview: Option<image::Handle>,
    pub capture_hovered: bool,
    pub download: Option<(ModelArtifact, u64, u64)>,
    pub theme: &'a Theme,
}

pub fn view(session: SessionView, ctx: &ViewContext<'_>) -> Element<'static, Message> {
    match session {
        SessionView::Loading => loading_view::view(ctx.download, ctx.theme),
        SessionView::InitFailed(err) => failed_view::init_failed(&err, ctx.theme),
        SessionView::Live { analyzing } => live_view::view(analyzing, ctx),
        SessionView::Result(dominant) => result_view::view(&dominant, ctx.theme),
        SessionView::Failed(err) => failed_view::view(&err, ctx),
    }
}
