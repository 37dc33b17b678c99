use iced::border::Border;
use iced::widget::{column, container, text};
use iced::{Alignment, Color, Element, Length, Theme};

use moodsnap_core::expression::domain::expression_scores::DominantExpression;

use crate::theme::{muted_color, surface_color};

const CORNER_RADIUS: f32 = 16.0;
const BORDER_WIDTH: f32 = 1.5;
const GLYPH_SIZE: f32 = 96.0;

/// Large glyph with the label and confidence underneath.
pub fn mood_card<'a, Message: 'a>(
    dominant: &DominantExpression,
    theme: &Theme,
) -> Element<'a, Message> {
    let muted = muted_color(theme);
    let content = column![
        text(dominant.label.glyph()).size(GLYPH_SIZE),
        text(dominant.label.to_string())
            .size(24.0)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..iced::Font::DEFAULT
            }),
        text(format!("{}% confidence", dominant.confidence_percent()))
            .size(13.0)
            .color(muted),
    ]
    .spacing(6)
    .align_x(Alignment::Center);

    card(content.into(), theme.palette().primary, theme)
}

/// Message card outlined in the danger color.
pub fn error_card<'a, Message: 'a>(message: String, theme: &Theme) -> Element<'a, Message> {
    let danger = theme.palette().danger;
    let content = column![
        text("\u{26A0}").size(28.0).color(danger),
        text(message).size(14.0).align_x(Alignment::Center),
    ]
    .spacing(8)
    .align_x(Alignment::Center);

    card(content.into(), danger, theme)
}

fn card<'a, Message: 'a>(
    content: Element<'a, Message>,
    accent: Color,
    theme: &Theme,
) -> Element<'a, Message> {
    let surface = surface_color(theme);
    container(content)
        .padding([24, 32])
        .width(Length::Fill)
        .center_x(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(surface.into()),
            border: Border {
                color: Color { a: 0.5, ..accent },
                width: BORDER_WIDTH,
                radius: CORNER_RADIUS.into(),
            },
            ..container::Style::default()
        })
        .into()
}
