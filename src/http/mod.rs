//! HTTP surface: router, response envelope, and feature gating.

pub mod gate;
mod response;
mod routes;

pub use gate::{FeatureGate, PlanLevel, require_feature};
pub use response::ApiResponse;
pub use routes::{AppState, router};
