use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

pub fn resolve_theme(dark: bool) -> Theme {
    let palette = if dark { dark_palette() } else { light_palette() };
    Theme::custom("MoodSnap", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xe5, 0xe5, 0xe7),
        primary: color!(0xf5, 0x9e, 0x2b),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xfa, 0xf8, 0xf5),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0xe0, 0x7a, 0x10),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

/// Card background, one step off the window background.
pub fn surface_color(theme: &Theme) -> Color {
    let bg = theme.palette().background;
    let luma = bg.r * 0.299 + bg.g * 0.587 + bg.b * 0.114;
    let shift = if luma > 0.5 { -0.04 } else { 0.08 };
    Color {
        r: (bg.r + shift).clamp(0.0, 1.0),
        g: (bg.g + shift).clamp(0.0, 1.0),
        b: (bg.b + shift).clamp(0.0, 1.0),
        a: 1.0,
    }
}

/// Secondary text.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

pub fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
