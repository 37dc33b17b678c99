//! BlazeFace face locator using ONNX Runtime via `ort`.
//!
//! Finds face boxes only; expression scoring happens on the crop it returns.

use crate::expression::domain::detection::DetectorOptions;
use crate::shared::constants::FACE_DETECTOR_INPUT_SIZE;
use crate::shared::frame::Frame;

use super::math::{nms, sigmoid, ScoredBox};

/// NMS IoU threshold.
const NMS_IOU_THRESH: f32 = 0.3;

/// Values per anchor in the regressor output (box deltas + 6 keypoints).
const REGRESSOR_STRIDE: usize = 16;

/// BlazeFace locator backed by an ONNX Runtime session.
pub struct BlazefaceLocator {
    session: ort::session::Session,
    anchors: Vec<[f32; 2]>,
}

impl BlazefaceLocator {
    pub fn new(session: ort::session::Session) -> Self {
        Self {
            session,
            anchors: generate_anchors(FACE_DETECTOR_INPUT_SIZE),
        }
    }

    /// Returns the highest-scoring face above `options.score_threshold`.
    pub fn locate_best(
        &mut self,
        frame: &Frame,
        options: &DetectorOptions,
    ) -> Result<Option<ScoredBox>, Box<dyn std::error::Error>> {
        options.validate()?;
        let size = options.input_size;

        let input_tensor = preprocess(frame, size);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, N, 16], classificators: [1, N, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut candidates = decode(
            reg_data,
            score_data,
            &self.anchors,
            size,
            frame.width(),
            frame.height(),
            options.score_threshold,
        );
        Ok(nms(&mut candidates, NMS_IOU_THRESH).into_iter().next())
    }
}

/// Decode anchor-relative boxes into frame coordinates, dropping those
/// whose sigmoid score falls below `threshold`.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    input_size: u32,
    frame_w: u32,
    frame_h: u32,
    threshold: f32,
) -> Vec<ScoredBox> {
    let scale = input_size as f32;
    let (fw, fh) = (frame_w as f32, frame_h as f32);
    let mut dets = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(anchors.len()) {
        let score = sigmoid(raw_score);
        if score < threshold {
            continue;
        }
        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / scale;
        let cy = anchor[1] + reg_data[offset + 1] / scale;
        let w = reg_data[offset + 2] / scale;
        let h = reg_data[offset + 3] / scale;

        dets.push(ScoredBox {
            bbox: [
                ((cx - w / 2.0) * fw).max(0.0),
                ((cy - h / 2.0) * fh).max(0.0),
                ((cx + w / 2.0) * fw).min(fw),
                ((cy + h / 2.0) * fh).min(fh),
            ],
            score,
        });
    }
    dets
}

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Short-range anchor layout: a stride-8 grid with 2 anchors per cell and
/// a stride-16 grid with 6 anchors per cell.
fn generate_anchors(input_size: u32) -> Vec<[f32; 2]> {
    let strides = [(8usize, 2usize), (16, 6)];
    let mut anchors = Vec::new();

    for &(stride, per_cell) in &strides {
        let grid = input_size as usize / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                anchors.extend(std::iter::repeat([cx, cy]).take(per_cell));
            }
        }
    }

    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logit(p: f32) -> f32 {
        (p / (1.0 - p)).ln()
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let frame = Frame::new(vec![255u8; 200 * 100 * 3], 200, 100);
        let tensor = preprocess(&frame, 128);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        assert!((tensor[[0, 2, 127, 127]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_anchor_count_for_native_size() {
        // 16x16 grid x 2 + 8x8 grid x 6 = 896
        assert_eq!(generate_anchors(128).len(), 896);
    }

    #[test]
    fn test_anchors_in_unit_range() {
        for a in generate_anchors(128) {
            assert!(a[0] > 0.0 && a[0] < 1.0);
            assert!(a[1] > 0.0 && a[1] < 1.0);
        }
    }

    #[test]
    fn test_decode_filters_by_threshold() {
        let anchors = vec![[0.5, 0.5], [0.25, 0.25]];
        let mut reg = vec![0.0f32; 2 * REGRESSOR_STRIDE];
        // 64x64 box centred on the first anchor
        reg[2] = 64.0;
        reg[3] = 64.0;
        let scores = [logit(0.9), logit(0.2)];

        let dets = decode(&reg, &scores, &anchors, 128, 200, 100, 0.5);

        assert_eq!(dets.len(), 1);
        assert!((dets[0].score - 0.9).abs() < 1e-4);
        assert_eq!(dets[0].bbox, [50.0, 25.0, 150.0, 75.0]);
    }

    #[test]
    fn test_decode_clamps_to_frame() {
        let anchors = vec![[0.05, 0.05]];
        let mut reg = vec![0.0f32; REGRESSOR_STRIDE];
        reg[2] = 64.0;
        reg[3] = 64.0;

        let dets = decode(&reg, &[logit(0.99)], &anchors, 128, 100, 100, 0.5);

        assert_eq!(dets[0].bbox[0], 0.0);
        assert_eq!(dets[0].bbox[1], 0.0);
    }

    #[test]
    fn test_decode_stops_on_short_regressors() {
        let anchors = vec![[0.5, 0.5], [0.5, 0.5]];
        let reg = vec![0.0f32; REGRESSOR_STRIDE];
        let dets = decode(&reg, &[logit(0.9), logit(0.9)], &anchors, 128, 10, 10, 0.5);
        assert_eq!(dets.len(), 1);
    }
}
