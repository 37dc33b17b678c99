use iced::widget::{button, column, row, text};
use iced::{Alignment, Element, Theme};

use moodsnap_core::session::session_error::SessionError;

use crate::app::Message;
use crate::theme::muted_color;
use crate::views::live_view::{capture_button, preview_pane};
use crate::views::ViewContext;
use crate::widgets::mood_card::error_card;

/// A capture failed: the camera stays live so the user can retry.
pub fn view(err: &SessionError, ctx: &ViewContext<'_>) -> Element<'static, Message> {
    column![
        preview_pane(ctx.preview.clone(), ctx.theme),
        error_card(err.to_string(), ctx.theme),
        row![
            capture_button(false, ctx.capture_hovered),
            button(text("Reset").size(14.0))
                .on_press(Message::Reset)
                .padding([8, 20])
                .style(button::secondary),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    ]
    .spacing(16)
    .align_x(Alignment::Center)
    .into()
}

/// Model loading failed; nothing but a restart recovers.
pub fn init_failed(err: &SessionError, theme: &Theme) -> Element<'static, Message> {
    let muted = muted_color(theme);
    let mut content = column![error_card(err.to_string(), theme)]
        .spacing(12)
        .align_x(Alignment::Center);
    if let Some(detail) = err.detail() {
        content = content.push(text(detail.to_string()).size(12.0).color(muted));
    }
    content
        .push(text("Restart MoodSnap to try again.").size(12.0).color(muted))
        .into()
}
