//! FER+ expression classifier using ONNX Runtime via `ort`.
//!
//! The model takes a `[1, 1, 64, 64]` grayscale face in raw `0..=255`
//! intensities and emits 8 logits.

use crate::expression::domain::detection::FaceBox;
use crate::expression::domain::expression_scores::ExpressionScores;
use crate::shared::constants::EXPRESSION_INPUT_SIZE;
use crate::shared::frame::Frame;

pub struct FerPlusClassifier {
    session: ort::session::Session,
}

impl FerPlusClassifier {
    pub fn new(session: ort::session::Session) -> Self {
        Self { session }
    }

    pub fn classify(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
        let input_tensor = preprocess_face(frame, face, EXPRESSION_INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        if outputs.len() == 0 {
            return Err("FER+ model produced no outputs".into());
        }
        let logits = outputs[0].try_extract_array::<f32>()?;
        let logits = logits.as_slice().ok_or("Cannot get logits slice")?;

        Ok(ExpressionScores::from_ferplus_logits(logits)?)
    }
}

/// Crop `face` out of `frame`, convert to luma and sample it down to a
/// `size × size` single-channel tensor.
fn preprocess_face(frame: &Frame, face: &FaceBox, size: u32) -> ndarray::Array4<f32> {
    let s = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, s, s));

    let max_x = frame.width().saturating_sub(1);
    let max_y = frame.height().saturating_sub(1);

    for y in 0..s {
        let src_y = face.y + ((y as f64 + 0.5) * face.height as f64 / s as f64) as u32;
        for x in 0..s {
            let src_x = face.x + ((x as f64 + 0.5) * face.width as f64 / s as f64) as u32;
            tensor[[0, 0, y, x]] = frame.luma(src_x.min(max_x), src_y.min(max_y));
        }
    }

    tensor
}
