use iced::widget::{button, column, text};
use iced::{Alignment, Element, Theme};

use moodsnap_core::expression::domain::expression_scores::DominantExpression;

use crate::app::Message;
use crate::widgets::mood_card::mood_card;

pub fn view(dominant: &DominantExpression, theme: &Theme) -> Element<'static, Message> {
    column![
        mood_card(dominant, theme),
        button(text("Take another").size(14.0))
            .on_press(Message::Reset)
            .padding([8, 20])
            .style(button::secondary),
    ]
    .spacing(20)
    .align_x(Alignment::Center)
    .into()
}
