use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::NewDepartment;
use crate::server::extract::ApiJson;
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// POST /api/departments
pub async fn post_department(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewDepartment>,
) -> Response {
    info!("POST /api/departments ({})", body.code);

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_department(body), "create department")
}

/// GET /api/departments
pub async fn get_departments(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /api/departments");
    respond(s.db.list_departments(), "fetch departments")
}

/// DELETE /api/departments/:department_id
pub async fn delete_department(
    Path(department_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/departments/{}", department_id);
    respond_deleted(
        s.db.delete_department(&department_id),
        "Department",
        &department_id,
    )
}
