//! Box arithmetic shared by the ONNX scoring backends.

use crate::expression::domain::detection::FaceBox;

/// A candidate face in frame pixel coordinates, `[x1, y1, x2, y2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredBox {
    pub bbox: [f32; 4],
    pub score: f32,
}

impl ScoredBox {
    /// Integer box clipped to a `width x height` frame, at least 1px wide.
    pub fn to_face_box(&self, width: u32, height: u32) -> FaceBox {
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        let x1 = self.bbox[0].clamp(0.0, max_x);
        let y1 = self.bbox[1].clamp(0.0, max_y);
        let x2 = self.bbox[2].clamp(x1 + 1.0, width as f32);
        let y2 = self.bbox[3].clamp(y1 + 1.0, height as f32);
        FaceBox {
            x: x1 as u32,
            y: y1 as u32,
            width: ((x2 - x1) as u32).max(1),
            height: ((y2 - y1) as u32).max(1),
        }
    }
}

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy non-maximum suppression. Output is sorted by descending score.
pub fn nms(dets: &mut [ScoredBox], iou_thresh: f32) -> Vec<ScoredBox> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i].bbox, &dets[j].bbox) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
