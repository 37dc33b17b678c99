pub mod model_loader;
pub mod readiness_gate;
