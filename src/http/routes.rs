//! Representative HTTP surface for the rules engine.
//!
//! Thin handlers: validate the request into a typed DTO, call the relevant
//! service, shape the JSON response. Everything interesting happens in
//! `policy` and `entitlements`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use crate::entitlements::{
    ActorIdentity, BulkChangeResult, FeatureAuditStore, FeatureCatalog, FeatureResolver,
    FeatureValue, PlanFeatureAdmin, PlanFeatureStore, PlanFeatureTable,
};
use crate::error::{PitchsideError, Result};
use crate::http::response::ApiResponse;
use crate::policy::{PolicyOutcome, PolicyService, PolicyStore, TenantPolicy};
use crate::validation::ValidatedJson;

/// Shared state for the rules-engine routes.
pub struct AppState<P, S, A>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    pub policy: Arc<PolicyService<P>>,
    pub resolver: Arc<FeatureResolver<S>>,
    pub admin: Arc<PlanFeatureAdmin<S, A>>,
}

impl<P, S, A> Clone for AppState<P, S, A>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            resolver: self.resolver.clone(),
            admin: self.admin.clone(),
        }
    }
}

impl<P, S, A> AppState<P, S, A>
where
    P: PolicyStore,
    S: PlanFeatureStore + Clone,
    A: FeatureAuditStore,
{
    #[must_use]
    pub fn new(
        policy_store: P,
        feature_store: S,
        audit_store: A,
        catalog: FeatureCatalog,
        table: PlanFeatureTable,
    ) -> Self {
        Self {
            policy: Arc::new(PolicyService::new(policy_store)),
            resolver: Arc::new(FeatureResolver::new(table.clone(), feature_store.clone())),
            admin: Arc::new(PlanFeatureAdmin::new(catalog, table, feature_store, audit_store)),
        }
    }
}

/// Build the rules-engine router.
pub fn router<P, S, A>(state: AppState<P, S, A>) -> Router
where
    P: PolicyStore + 'static,
    S: PlanFeatureStore + 'static,
    A: FeatureAuditStore + 'static,
{
    Router::new()
        .route("/signup/evaluate", post(evaluate_signup))
        .route("/plans", get(list_plans))
        .route("/plan-features/:plan_code", get(get_plan_features))
        .route("/plan-features/:plan_code/reset", post(reset_plan_features))
        .route(
            "/plan-features/:plan_code/copy-from/:source_code",
            post(copy_plan_features),
        )
        .route(
            "/plan-features/:plan_code/:feature_key",
            put(put_plan_feature),
        )
        .with_state(state)
}

#[derive(Deserialize, Validate)]
struct EvaluateSignupRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    tenant_id: String,
    /// ISO date, parsed explicitly so a bad value yields a field-level 400.
    dob: String,
}

#[derive(Serialize)]
struct EvaluateSignupResponse {
    outcome: PolicyOutcome,
    policy: TenantPolicy,
}

async fn evaluate_signup<P, S, A>(
    State(state): State<AppState<P, S, A>>,
    ValidatedJson(req): ValidatedJson<EvaluateSignupRequest>,
) -> Result<Json<EvaluateSignupResponse>>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    let dob = NaiveDate::parse_from_str(&req.dob, "%Y-%m-%d")
        .map_err(|_| PitchsideError::bad_request("dob: must be a valid date (YYYY-MM-DD)"))?;

    let today = Utc::now().date_naive();
    if dob >= today {
        return Err(PitchsideError::bad_request("dob: must be a past date"));
    }

    let (outcome, policy) = state.policy.evaluate(&req.tenant_id, dob, today).await?;
    Ok(Json(EvaluateSignupResponse { outcome, policy }))
}

#[derive(Serialize)]
struct PlanListItem {
    code: String,
    name: String,
    price_cents: i64,
    price: String,
}

async fn list_plans() -> Json<Vec<PlanListItem>> {
    let plans = crate::entitlements::standard_plans()
        .into_iter()
        .map(|p| PlanListItem {
            code: p.tier.as_str().to_string(),
            name: p.name.clone(),
            price_cents: p.price_cents,
            price: p.formatted_price(),
        })
        .collect();
    Json(plans)
}

#[derive(Serialize)]
struct PlanFeaturesResponse {
    plan_code: String,
    features: BTreeMap<String, FeatureValue>,
}

async fn get_plan_features<P, S, A>(
    State(state): State<AppState<P, S, A>>,
    Path(plan_code): Path<String>,
) -> Result<Json<PlanFeaturesResponse>>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    let features = state
        .resolver
        .effective_features(&plan_code)
        .await?
        .into_iter()
        .collect();
    Ok(Json(PlanFeaturesResponse {
        plan_code,
        features,
    }))
}

#[derive(Serialize)]
struct UpdatedFeatureResponse {
    plan_code: String,
    feature_key: String,
    value: FeatureValue,
}

async fn put_plan_feature<P, S, A>(
    State(state): State<AppState<P, S, A>>,
    Path((plan_code, feature_key)): Path<(String, String)>,
    headers: HeaderMap,
    Json(value): Json<FeatureValue>,
) -> Result<Json<UpdatedFeatureResponse>>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    let actor = actor_from_headers(&headers)?;
    state
        .admin
        .set_feature(&plan_code, &feature_key, value.clone(), &actor)
        .await?;
    Ok(Json(UpdatedFeatureResponse {
        plan_code,
        feature_key,
        value,
    }))
}

async fn copy_plan_features<P, S, A>(
    State(state): State<AppState<P, S, A>>,
    Path((plan_code, source_code)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<ApiResponse<BulkChangeResult>>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    let actor = actor_from_headers(&headers)?;
    let result = state
        .admin
        .copy_plan_features(&source_code, &plan_code, &actor)
        .await?;
    Ok(ApiResponse::success(result))
}

async fn reset_plan_features<P, S, A>(
    State(state): State<AppState<P, S, A>>,
    Path(plan_code): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<BulkChangeResult>>
where
    P: PolicyStore,
    S: PlanFeatureStore,
    A: FeatureAuditStore,
{
    let actor = actor_from_headers(&headers)?;
    let result = state.admin.reset_to_defaults(&plan_code, &actor).await?;
    Ok(ApiResponse::success(result))
}

/// Actor identity for audit entries, from request metadata.
fn actor_from_headers(headers: &HeaderMap) -> Result<ActorIdentity> {
    let actor_id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PitchsideError::bad_request("x-actor-id header is required"))?;

    let mut actor = ActorIdentity::new(actor_id);
    if let Some(ip) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        actor = actor.with_ip(ip);
    }
    if let Some(user_agent) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        actor = actor.with_user_agent(user_agent);
    }
    if let Some(reason) = headers.get("x-change-reason").and_then(|v| v.to_str().ok()) {
        actor = actor.with_reason(reason);
    }
    Ok(actor)
}
