use crate::expression::domain::detection::{Detection, DetectorOptions};
use crate::expression::domain::expression_scorer::ExpressionScorer;
use crate::readiness::domain::model_loader::LoadedModels;
use crate::shared::frame::Frame;

use super::blazeface_locator::BlazefaceLocator;
use super::ferplus_classifier::FerPlusClassifier;

/// Two-stage scorer: BlazeFace picks the best face, FER+ scores its crop.
pub struct OnnxExpressionScorer {
    locator: BlazefaceLocator,
    classifier: FerPlusClassifier,
}

impl OnnxExpressionScorer {
    pub fn from_models(models: LoadedModels<ort::session::Session>) -> Self {
        Self {
            locator: BlazefaceLocator::new(models.face_detector),
            classifier: FerPlusClassifier::new(models.expression_classifier),
        }
    }
}

impl ExpressionScorer for OnnxExpressionScorer {
    fn detect_single_face(
        &mut self,
        frame: &Frame,
        options: &DetectorOptions,
    ) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Err("cannot score an empty frame".into());
        }

        let Some(best) = self.locator.locate_best(frame, options)? else {
            log::debug!("No face above threshold {}", options.score_threshold);
            return Ok(None);
        };

        let face = best.to_face_box(frame.width(), frame.height());
        let expressions = self.classifier.classify(frame, &face)?;
        log::debug!(
            "Face at ({}, {}) {}x{} score {:.2}",
            face.x,
            face.y,
            face.width,
            face.height,
            best.score
        );

        Ok(Some(Detection {
            face,
            score: best.score,
            expressions,
        }))
    }
}
