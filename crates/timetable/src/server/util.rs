use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::db::RequiredFields;
use crate::server::types::ApiErrorType;

/// Rejects a payload whose required text fields are blank.
pub fn check_required<T: RequiredFields>(payload: &T) -> Result<(), Response> {
    match payload.blank_field() {
        Some(field) => {
            warn!("Rejected payload with blank field `{field}`");
            Err(ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Missing required field",
                Some(format!("`{field}` must not be empty")),
            ))
            .into_response())
        }
        None => Ok(()),
    }
}

/// Turns a store result into a JSON response, or a 500 naming `what` failed.
pub fn respond<T: Serialize>(result: rusqlite::Result<T>, what: &str) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            error!("Failed to {what}: {e}");
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {what}").as_str(),
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// Responds to a delete of one `entity` (e.g. "Department"): a message on
/// success, 404 if nothing had that id, 500 if the store failed.
pub fn respond_deleted(result: rusqlite::Result<bool>, entity: &str, id: &str) -> Response {
    match result {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": format!("{entity} deleted successfully") })),
        )
            .into_response(),
        Ok(false) => {
            warn!("{entity} not found: {id}");
            ApiErrorType::from((
                StatusCode::NOT_FOUND,
                format!("{entity} not found").as_str(),
                None,
            ))
            .into_response()
        }
        Err(e) => {
            error!("Failed to delete {entity} {id}: {e}");
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete {entity}").as_str(),
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
