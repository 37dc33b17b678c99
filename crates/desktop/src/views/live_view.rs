use iced::border::Border;
use iced::widget::{column, container, image, row, text};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use crate::app::Message;
use crate::theme::{muted_color, surface_color};
use crate::views::ViewContext;
use crate::widgets::primary_button::primary_button;

const PREVIEW_HEIGHT: f32 = 360.0;

pub fn view(analyzing: bool, ctx: &ViewContext<'_>) -> Element<'static, Message> {
    column![
        preview_pane(ctx.preview.clone(), ctx.theme),
        capture_button(analyzing, ctx.capture_hovered),
    ]
    .spacing(16)
    .align_x(Alignment::Center)
    .into()
}

/// Latest camera frame, or a placeholder until one arrives.
pub(super) fn preview_pane(preview: Option<image::Handle>, theme: &Theme) -> Element<'static, Message> {
    let surface = surface_color(theme);
    let inner: Element<'static, Message> = match preview {
        Some(handle) => image(handle)
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => text("Waiting for camera...")
            .size(14.0)
            .color(muted_color(theme))
            .into(),
    };

    container(inner)
        .width(Length::Fill)
        .height(PREVIEW_HEIGHT)
        .center_x(Length::Fill)
        .center_y(PREVIEW_HEIGHT)
        .style(move |_theme: &Theme| container::Style {
            background: Some(surface.into()),
            border: Border {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.1),
                width: 1.0,
                radius: 16.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

/// Disabled while a capture is in flight.
pub(super) fn capture_button(analyzing: bool, hovered: bool) -> Element<'static, Message> {
    let label = if analyzing {
        "Analyzing..."
    } else {
        "\u{1F4F8}  Capture"
    };
    let on_press = (!analyzing).then_some(Message::Capture);

    primary_button(
        move || {
            row![text(label).size(15.0).color(Color::WHITE)]
                .align_y(Alignment::Center)
                .into()
        },
        on_press,
        hovered,
        Message::CaptureHovered,
        [10, 28],
    )
}
