use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::expression_label::ExpressionLabel;

/// FER+ output order: neutral, happiness, surprise, sadness, anger,
/// disgust, fear, contempt. Contempt folds into `Disgusted`.
const FERPLUS_LABELS: [ExpressionLabel; 8] = [
    ExpressionLabel::Neutral,
    ExpressionLabel::Happy,
    ExpressionLabel::Surprised,
    ExpressionLabel::Sad,
    ExpressionLabel::Angry,
    ExpressionLabel::Disgusted,
    ExpressionLabel::Fearful,
    ExpressionLabel::Disgusted,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoresError {
    #[error("expression scores must not be empty")]
    EmptyScores,
    #[error("label {0} appears more than once")]
    DuplicateLabel(ExpressionLabel),
    #[error("expected {expected} classifier outputs, got {actual}")]
    OutputCount { expected: usize, actual: usize },
}

/// An ordered, non-empty distribution of probabilities over expression labels.
///
/// Order is significant: it is the iteration order used for tie-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionScores {
    scores: Vec<(ExpressionLabel, f32)>,
}

/// The winning label of a distribution together with its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantExpression {
    pub label: ExpressionLabel,
    pub probability: f32,
}

impl DominantExpression {
    pub fn confidence_percent(&self) -> u8 {
        (self.probability.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

impl ExpressionScores {
    pub fn new(scores: Vec<(ExpressionLabel, f32)>) -> Result<Self, ScoresError> {
        if scores.is_empty() {
            return Err(ScoresError::EmptyScores);
        }
        for (i, (label, _)) in scores.iter().enumerate() {
            if scores[..i].iter().any(|(seen, _)| seen == label) {
                return Err(ScoresError::DuplicateLabel(*label));
            }
        }
        Ok(Self { scores })
    }

    /// Softmax over the 8 FER+ logits, folded into the closed label set in
    /// [`ExpressionLabel::ALL`] order.
    pub fn from_ferplus_logits(logits: &[f32]) -> Result<Self, ScoresError> {
        if logits.len() != FERPLUS_LABELS.len() {
            return Err(ScoresError::OutputCount {
                expected: FERPLUS_LABELS.len(),
                actual: logits.len(),
            });
        }

        let probabilities = softmax(logits);
        let scores = ExpressionLabel::ALL
            .into_iter()
            .map(|label| {
                let p = FERPLUS_LABELS
                    .iter()
                    .zip(&probabilities)
                    .filter(|(l, _)| **l == label)
                    .map(|(_, p)| *p)
                    .sum::<f32>();
                (label, p)
            })
            .collect();
        Ok(Self { scores })
    }

    pub fn get(&self, label: ExpressionLabel) -> Option<f32> {
        self.scores
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpressionLabel, f32)> + '_ {
        self.scores.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn dominant(&self) -> DominantExpression {
        reduce_dominant(self)
    }
}

/// Linear scan keeping the running maximum.
///
/// Only a strictly greater probability replaces the current best, so on a
/// tie the label met first in iteration order wins. That order comes from
/// how the distribution was built; it is stable but not a fairness policy.
/// A NaN probability never beats a number.
pub fn reduce_dominant(scores: &ExpressionScores) -> DominantExpression {
    // Non-empty by construction.
    let (first_label, first_p) = scores.scores[0];

    let mut best = DominantExpression {
        label: first_label,
        probability: first_p,
    };
    for (label, p) in scores.iter().skip(1) {
        if p > best.probability || (best.probability.is_nan() && !p.is_nan()) {
            best = DominantExpression {
                label,
                probability: p,
            };
        }
    }
    best
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
