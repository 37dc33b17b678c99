use moodsnap_core::expression::domain::expression_scores::DominantExpression;
use moodsnap_core::session::session_error::SessionError;
use moodsnap_core::session::session_state::SessionView;

pub fn render(view: &SessionView) -> String {
    match view {
        SessionView::Loading => render_loading(),
        SessionView::InitFailed(err) => render_error(err),
        SessionView::Live { analyzing } => render_live(*analyzing),
        SessionView::Result(dominant) => render_result(dominant),
        SessionView::Failed(err) => render_error(err),
    }
}

fn render_loading() -> String {
    "Loading expression models...".to_string()
}

fn render_live(analyzing: bool) -> String {
    if analyzing {
        "Analyzing...".to_string()
    } else {
        "Camera live. Enter 'c' to capture, 'q' to quit.".to_string()
    }
}

fn render_result(dominant: &DominantExpression) -> String {
    format!(
        "{} {} ({}%)",
        dominant.label.glyph(),
        dominant.label,
        dominant.confidence_percent()
    )
}

fn render_error(err: &SessionError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodsnap_core::expression::domain::expression_label::ExpressionLabel;
    use moodsnap_core::session::session_error::ErrorKind;

    #[test]
    fn test_result_line() {
        let view = SessionView::Result(DominantExpression {
            label: ExpressionLabel::Happy,
            probability: 0.8,
        });
        assert_eq!(render(&view), "\u{1F60A} Happy (80%)");
    }

    #[test]
    fn test_failure_shows_user_message_only() {
        let err = SessionError::with_detail(ErrorKind::NoFaceDetected, "0 candidates");
        assert_eq!(
            render(&SessionView::Failed(err)),
            "No face detected. Face the camera and try again."
        );
    }

    #[test]
    fn test_init_failure_advises_reload() {
        let view = SessionView::InitFailed(ErrorKind::ModelLoadFailed.into());
        assert!(render(&view).contains("reload"));
    }

    #[test]
    fn test_live_prompts_for_capture() {
        assert!(render(&SessionView::Live { analyzing: false }).contains("'c'"));
        assert_eq!(render(&SessionView::Live { analyzing: true }), "Analyzing...");
    }
}
