use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for Pitchside services.
#[derive(Debug, thiserror::Error)]
pub enum PitchsideError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A plan-gated feature was requested without entitlement.
    ///
    /// Serialized as a 403 with a structured payload so the client can
    /// prompt an upgrade flow instead of showing a generic error.
    #[error("Feature '{feature}' is not available on the '{plan_level}' plan")]
    UpgradeRequired { feature: String, plan_level: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Standard error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    error_id: String,
}

/// Response body for [`PitchsideError::UpgradeRequired`].
#[derive(Serialize)]
struct UpgradeRequiredResponse {
    error: String,
    feature: String,
    plan_level: String,
    upgrade_required: bool,
}

impl PitchsideError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn upgrade_required(feature: impl Into<String>, plan_level: impl Into<String>) -> Self {
        Self::UpgradeRequired {
            feature: feature.into(),
            plan_level: plan_level.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) | Self::UpgradeRequired { .. } => StatusCode::FORBIDDEN,
            Self::Internal(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for client responses.
    ///
    /// Client errors (4xx) expose their message; server errors (5xx) return a
    /// generic message and the detail is only logged server-side.
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(msg) => format!("Not found: {}", msg),
            Self::BadRequest(msg) => format!("Bad request: {}", msg),
            Self::Forbidden(msg) => format!("Forbidden: {}", msg),
            Self::UpgradeRequired { .. } => self.to_string(),
            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for PitchsideError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request failed"
        );

        if let Self::UpgradeRequired { feature, plan_level } = &self {
            let body = UpgradeRequiredResponse {
                error: self.safe_message(),
                feature: feature.clone(),
                plan_level: plan_level.clone(),
                upgrade_required: true,
            };
            return (status, Json(body)).into_response();
        }

        let body = ErrorResponse {
            error: self.safe_message(),
            error_id,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for Pitchside handlers.
pub type Result<T> = std::result::Result<T, PitchsideError>;

impl From<serde_json::Error> for PitchsideError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            PitchsideError::BadRequest(format!("JSON error: {}", err))
        } else {
            PitchsideError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<validator::ValidationErrors> for PitchsideError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field_errors: Vec<String> = err
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.as_ref()))
                    .collect();
                if messages.is_empty() {
                    format!("{}: invalid", field)
                } else {
                    format!("{}: {}", field, messages.join(", "))
                }
            })
            .collect();

        PitchsideError::BadRequest(format!("Validation failed: {}", field_errors.join("; ")))
    }
}
