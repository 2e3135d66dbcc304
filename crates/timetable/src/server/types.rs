use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;

/// Error body returned by every endpoint: `{"detail": ..., "context": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    /// Short, human readable description of what went wrong
    detail: String,
    /// Underlying cause, when there is one worth showing
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl ApiErrorType {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, detail, context): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            detail: detail.to_string(),
            context,
        }
    }
}

impl From<AuthError> for ApiErrorType {
    fn from(error: AuthError) -> Self {
        if error.needs_reauth() {
            let detail = match error {
                AuthError::IdentityRejected { .. } => "Invalid session ID".to_string(),
                ref other => other.to_string(),
            };
            return Self {
                status: StatusCode::UNAUTHORIZED,
                detail,
                context: None,
            };
        }

        let (status, detail, context) = match error {
            AuthError::UserNotFound { .. } => (StatusCode::NOT_FOUND, "User not found", None),
            AuthError::MissingSessionId => {
                (StatusCode::BAD_REQUEST, "Missing X-Session-ID header", None)
            }
            AuthError::Identity { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Identity provider error",
                Some(message),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication failed",
                Some(other.to_string()),
            ),
        };

        Self::from((status, detail, context))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}
