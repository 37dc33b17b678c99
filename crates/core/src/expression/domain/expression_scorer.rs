use super::detection::{DetectorOptions, Detection};
use crate::shared::frame::Frame;

/// Domain interface for single-face expression scoring.
///
/// Only the highest-confidence face is reported, always with its
/// expression distribution attached. `Ok(None)` means no face was found.
/// Implementations hold inference sessions, hence `&mut self`.
pub trait ExpressionScorer: Send {
    fn detect_single_face(
        &mut self,
        frame: &Frame,
        options: &DetectorOptions,
    ) -> Result<Option<Detection>, Box<dyn std::error::Error>>;
}
