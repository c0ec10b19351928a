//! Request validation support.
//!
//! Every endpoint deserializes into one validated DTO before any business
//! logic runs; nothing downstream ever sees a loose JSON shape. Backed by
//! the `validator` crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use pitchside::validation::ValidatedJson;
//! use validator::Validate;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Validate)]
//! struct EvaluateRequest {
//!     #[validate(length(min = 1))]
//!     tenant_id: String,
//!     dob: chrono::NaiveDate,
//! }
//!
//! async fn evaluate(
//!     ValidatedJson(req): ValidatedJson<EvaluateRequest>
//! ) -> pitchside::Result<axum::Json<serde_json::Value>> {
//!     // req is guaranteed to be valid
//!     Ok(axum::Json(serde_json::json!({"status": "ok"})))
//! }
//! ```

use async_trait::async_trait;
use axum::{Json, extract::Request};
use serde::Deserialize;
use validator::Validate;

use crate::error::{PitchsideError, Result};

/// Wrapper for validated JSON request bodies.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: for<'de> Deserialize<'de> + Validate + Send,
    S: Send + Sync,
{
    type Rejection = PitchsideError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| PitchsideError::bad_request(format!("Invalid JSON: {}", e)))?;

        validate(&json.0)?;
        Ok(ValidatedJson(json.0))
    }
}

/// Wrapper for validated query parameters.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> axum::extract::FromRequestParts<S> for ValidatedQuery<T>
where
    T: for<'de> Deserialize<'de> + Validate + Send,
    S: Send + Sync,
{
    type Rejection = PitchsideError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let query: axum::extract::Query<T> =
            axum::extract::Query::from_request_parts(parts, state)
                .await
                .map_err(|e| PitchsideError::bad_request(format!("Invalid query: {}", e)))?;

        validate(&query.0)?;
        Ok(ValidatedQuery(query.0))
    }
}

fn validate<T: Validate>(value: &T) -> Result<()> {
    value.validate().map_err(|errors| {
        let error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let msg = error
                        .message
                        .as_ref()
                        .map(|m| m.as_ref())
                        .unwrap_or_else(|| error.code.as_ref());
                    format!("{}: {}", field, msg)
                })
            })
            .collect();

        PitchsideError::bad_request(format!("Validation failed: {}", error_messages.join(", ")))
    })
}
