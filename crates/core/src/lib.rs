pub mod capture;
pub mod expression;
pub mod readiness;
pub mod session;
pub mod shared;
