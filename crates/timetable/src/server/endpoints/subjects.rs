use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::{DepartmentFilter, NewSubject};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// POST /api/subjects
pub async fn post_subject(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewSubject>,
) -> Response {
    info!("POST /api/subjects ({})", body.code);

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_subject(body), "create subject")
}

/// GET /api/subjects
///
/// Query parameters:
/// - `department_id` (optional): only subjects of this department
pub async fn get_subjects(
    State(s): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<DepartmentFilter>,
) -> Response {
    info!("GET /api/subjects (department_id={:?})", filter.department_id);
    respond(s.db.list_subjects(&filter), "fetch subjects")
}

/// DELETE /api/subjects/:subject_id
pub async fn delete_subject(
    Path(subject_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/subjects/{}", subject_id);
    respond_deleted(s.db.delete_subject(&subject_id), "Subject", &subject_id)
}
