use std::time::Duration;

use iced::border::Border;
use iced::widget::{button, container, mouse_area};
use iced::{Color, Element, Padding, Shadow, Theme, Vector};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

const HOVER_DARKEN: f32 = 0.05;
const FLOAT_HEIGHT: f32 = 1.0;
const CORNER_RADIUS: f32 = 10.0;
const SHADOW_BLUR_BASE: f32 = 10.0;
const SHADOW_BLUR_HOVER: f32 = 15.0;
const SHADOW_OFFSET_Y: f32 = 3.0;
const SHADOW_ALPHA_BASE: f32 = 0.25;
const SHADOW_ALPHA_HOVER: f32 = 0.35;
const DISABLED_ALPHA: f32 = 0.4;
const ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Accent button that lifts on hover. `on_press: None` renders it disabled.
pub fn primary_button<'a, Message: Clone + 'a>(
    content: impl Fn() -> Element<'a, Message> + 'a,
    on_press: Option<Message>,
    hovered: bool,
    on_hover: impl Fn(bool) -> Message + 'a,
    padding: [u16; 2],
) -> Element<'a, Message> {
    let enabled = on_press.is_some();
    let target = if hovered && enabled { 1.0_f32 } else { 0.0 };

    let animated: Element<'a, Message> = AnimationBuilder::new(target, move |t: f32| {
        build_button(&content, on_press.clone(), padding, t.clamp(0.0, 1.0))
    })
    .animates_layout(true)
    .animation(Easing::EASE_OUT.with_duration(ANIMATION_DURATION))
    .into();

    mouse_area(animated)
        .on_enter(on_hover(true))
        .on_exit(on_hover(false))
        .into()
}

fn build_button<'a, Message: Clone + 'a>(
    content: &dyn Fn() -> Element<'a, Message>,
    on_press: Option<Message>,
    padding: [u16; 2],
    hover_amount: f32,
) -> Element<'a, Message> {
    let btn = button(content())
        .on_press_maybe(on_press)
        .padding(padding)
        .style(move |theme: &Theme, status: button::Status| {
            let base = theme.extended_palette().primary.base.color;
            match status {
                button::Status::Disabled => disabled(base),
                button::Status::Pressed => styled(base, 1.0),
                _ => styled(base, hover_amount),
            }
        });

    let rise = hover_amount * FLOAT_HEIGHT;
    container(btn)
        .padding(Padding {
            top: FLOAT_HEIGHT - rise,
            bottom: rise,
            ..Padding::ZERO
        })
        .into()
}

fn styled(base: Color, hover_amount: f32) -> button::Style {
    let t = hover_amount;
    button::Style {
        background: Some(darken(base, t).into()),
        text_color: Color::WHITE,
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        shadow: Shadow {
            color: Color {
                a: lerp(SHADOW_ALPHA_BASE, SHADOW_ALPHA_HOVER, t),
                ..base
            },
            offset: Vector::new(0.0, SHADOW_OFFSET_Y),
            blur_radius: lerp(SHADOW_BLUR_BASE, SHADOW_BLUR_HOVER, t),
        },
        ..button::Style::default()
    }
}

fn disabled(base: Color) -> button::Style {
    button::Style {
        background: Some(
            Color {
                a: DISABLED_ALPHA,
                ..base
            }
            .into(),
        ),
        text_color: Color {
            a: 0.8,
            ..Color::WHITE
        },
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        ..button::Style::default()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn darken(color: Color, amount: f32) -> Color {
    let shift = HOVER_DARKEN * amount;
    Color {
        r: (color.r - shift).max(0.0),
        g: (color.g - shift).max(0.0),
        b: (color.b - shift).max(0.0),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darken_clamps_at_black() {
        let c = darken(Color::from_rgb(0.01, 0.5, 1.0), 1.0);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_has_no_shadow() {
        let style = disabled(Color::from_rgb(1.0, 0.5, 0.0));
        assert_eq!(style.shadow.blur_radius, 0.0);
    }
}
