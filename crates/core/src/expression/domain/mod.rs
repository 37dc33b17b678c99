pub mod detection;
pub mod expression_label;
pub mod expression_scorer;
pub mod expression_scores;
