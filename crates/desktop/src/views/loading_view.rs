use iced::widget::{column, progress_bar, text};
use iced::{Alignment, Element, Theme};

use moodsnap_core::readiness::domain::model_loader::ModelArtifact;

use crate::app::Message;
use crate::theme::muted_color;

pub fn view(download: Option<(ModelArtifact, u64, u64)>, theme: &Theme) -> Element<'static, Message> {
    let muted = muted_color(theme);
    let mut content = column![
        text("\u{23F3}").size(40.0),
        text("Loading expression models...").size(16.0),
    ]
    .spacing(10)
    .align_x(Alignment::Center);

    if let Some((artifact, done, total)) = download {
        if total > 0 && done < total {
            let pct = done as f32 / total as f32 * 100.0;
            content = content
                .push(progress_bar(0.0..=100.0, pct))
                .push(text(format!("Downloading {artifact} model ({pct:.0}%)")).size(12.0).color(muted));
        }
    }

    content.into()
}
