//! Plan-feature gating middleware.
//!
//! Gates an endpoint on a feature from the static plan table — no storage
//! round trip on the request path. An unentitled request gets a 403 with a
//! structured payload (`upgrade_required: true`) so the client can prompt an
//! upgrade flow.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, routing::post, middleware::from_fn_with_state};
//! use pitchside::entitlements::PlanFeatureTable;
//! use pitchside::http::gate::{FeatureGate, require_feature};
//!
//! async fn promote() -> &'static str { "ok" }
//!
//! let table = Arc::new(PlanFeatureTable::standard());
//! let app: Router = Router::new()
//!     .route("/waitlist/promote", post(promote))
//!     .layer(from_fn_with_state(
//!         FeatureGate::new(table, "waitlist_auto_promote"),
//!         require_feature,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::entitlements::PlanFeatureTable;
use crate::error::{PitchsideError, Result};

/// The requester's resolved plan level.
///
/// Inserted as a request extension by whatever upstream middleware
/// authenticates the tenant. Absent it, the gate falls back to the
/// `x-plan-level` header, and finally to the free tier — never upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLevel(pub String);

/// State for [`require_feature`]: the static table plus the gated key.
#[derive(Clone)]
pub struct FeatureGate {
    table: Arc<PlanFeatureTable>,
    feature: &'static str,
}

impl FeatureGate {
    #[must_use]
    pub fn new(table: Arc<PlanFeatureTable>, feature: &'static str) -> Self {
        Self { table, feature }
    }
}

/// Middleware fn enforcing a [`FeatureGate`].
pub async fn require_feature(
    State(gate): State<FeatureGate>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let plan_level = req
        .extensions()
        .get::<PlanLevel>()
        .map(|p| p.0.clone())
        .or_else(|| {
            req.headers()
                .get("x-plan-level")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
        .unwrap_or_else(|| "free".to_string());

    if !gate.table.has_feature_for_code(&plan_level, gate.feature) {
        tracing::debug!(
            target: "pitchside::gate",
            feature = %gate.feature,
            plan_level = %plan_level,
            "Feature gate denied request"
        );
        return Err(PitchsideError::upgrade_required(gate.feature, plan_level));
    }

    Ok(next.run(req).await)
}
