use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Glyph shown for a label the closed set does not recognise.
pub const FALLBACK_GLYPH: &str = "\u{1F914}";

/// The closed set of facial expressions the classifier scores.
///
/// Declaration order is the iteration order of [`ExpressionLabel::ALL`],
/// which the dominant-label reducer uses to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionLabel {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown expression label: {0:?}")]
pub struct UnknownLabel(pub String);

impl ExpressionLabel {
    pub const ALL: [ExpressionLabel; 7] = [
        ExpressionLabel::Neutral,
        ExpressionLabel::Happy,
        ExpressionLabel::Sad,
        ExpressionLabel::Angry,
        ExpressionLabel::Fearful,
        ExpressionLabel::Disgusted,
        ExpressionLabel::Surprised,
    ];

    /// Lowercase wire name, e.g. `"happy"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ExpressionLabel::Neutral => "neutral",
            ExpressionLabel::Happy => "happy",
            ExpressionLabel::Sad => "sad",
            ExpressionLabel::Angry => "angry",
            ExpressionLabel::Fearful => "fearful",
            ExpressionLabel::Disgusted => "disgusted",
            ExpressionLabel::Surprised => "surprised",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ExpressionLabel::Neutral => "\u{1F610}",
            ExpressionLabel::Happy => "\u{1F60A}",
            ExpressionLabel::Sad => "\u{1F622}",
            ExpressionLabel::Angry => "\u{1F620}",
            ExpressionLabel::Fearful => "\u{1F628}",
            ExpressionLabel::Disgusted => "\u{1F922}",
            ExpressionLabel::Surprised => "\u{1F632}",
        }
    }
}

/// Maps a raw label string to its glyph. Total: anything outside the
/// closed set maps to [`FALLBACK_GLYPH`].
pub fn glyph_for_label(label: &str) -> &'static str {
    label
        .parse::<ExpressionLabel>()
        .map(ExpressionLabel::glyph)
        .unwrap_or(FALLBACK_GLYPH)
}

impl fmt::Display for ExpressionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionLabel::Neutral => write!(f, "Neutral"),
            ExpressionLabel::Happy => write!(f, "Happy"),
            ExpressionLabel::Sad => write!(f, "Sad"),
            ExpressionLabel::Angry => write!(f, "Angry"),
            ExpressionLabel::Fearful => write!(f, "Fearful"),
            ExpressionLabel::Disgusted => write!(f, "Disgusted"),
            ExpressionLabel::Surprised => write!(f, "Surprised"),
        }
    }
}

impl FromStr for ExpressionLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExpressionLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}
