use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::expression_scores::ExpressionScores;
use crate::shared::constants::{
    DEFAULT_INPUT_SIZE, DEFAULT_SCORE_THRESHOLD, FACE_DETECTOR_INPUT_SIZE,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorOptionsError {
    #[error("input size must be {expected} to match the face detector model, got {actual}")]
    InputSize { expected: u32, actual: u32 },
    #[error("score threshold must be between 0.0 and 1.0, got {0}")]
    ScoreThreshold(f32),
}

/// Tuning handed to the scorer unchanged; the session never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorOptions {
    /// Square resolution the face detector runs at.
    pub input_size: u32,
    /// Minimum face confidence in `[0, 1]`.
    pub score_threshold: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl DetectorOptions {
    /// The detector artifact has a fixed input shape, so any other size
    /// would fail at inference time on every capture.
    pub fn validate(&self) -> Result<(), DetectorOptionsError> {
        if self.input_size != FACE_DETECTOR_INPUT_SIZE {
            return Err(DetectorOptionsError::InputSize {
                expected: FACE_DETECTOR_INPUT_SIZE,
                actual: self.input_size,
            });
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(DetectorOptionsError::ScoreThreshold(self.score_threshold));
        }
        Ok(())
    }
}

/// Axis-aligned face box in pixel coordinates of the scored frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The single face a scorer picked, with its expression distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub face: FaceBox,
    pub score: f32,
    pub expressions: ExpressionScores,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(DetectorOptions::default().validate(), Ok(()));
    }

    #[rstest]
    #[case::larger(256)]
    #[case::smaller(64)]
    #[case::zero(0)]
    fn test_size_other_than_model_input_rejected(#[case] input_size: u32) {
        let options = DetectorOptions {
            input_size,
            ..DetectorOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(DetectorOptionsError::InputSize {
                expected: FACE_DETECTOR_INPUT_SIZE,
                actual: input_size
            })
        );
    }

    #[rstest]
    #[case::negative(-0.1)]
    #[case::above_one(1.5)]
    #[case::nan(f32::NAN)]
    fn test_threshold_out_of_range_rejected(#[case] score_threshold: f32) {
        let options = DetectorOptions {
            score_threshold,
            ..DetectorOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(DetectorOptionsError::ScoreThreshold(_))
        ));
    }
}
