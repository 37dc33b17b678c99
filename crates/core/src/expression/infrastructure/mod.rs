pub mod blazeface_locator;
pub mod ferplus_classifier;
pub mod math;
pub mod onnx_expression_scorer;
