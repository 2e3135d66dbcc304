use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::{DepartmentFilter, NewStaff};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// POST /api/staff
pub async fn post_staff(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewStaff>,
) -> Response {
    info!("POST /api/staff ({})", body.email);

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_staff(body), "create staff member")
}

/// GET /api/staff
///
/// Query parameters:
/// - `department_id` (optional): only staff of this department
pub async fn get_staff(
    State(s): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<DepartmentFilter>,
) -> Response {
    info!("GET /api/staff (department_id={:?})", filter.department_id);
    respond(s.db.list_staff(&filter), "fetch staff")
}

/// DELETE /api/staff/:staff_id
pub async fn delete_staff(
    Path(staff_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/staff/{}", staff_id);
    respond_deleted(s.db.delete_staff(&staff_id), "Staff", &staff_id)
}

/// GET /api/staff/:staff_id/schedule
///
/// Returns every timetable entry assigned to the staff member. The staff
/// id is not checked against the staff collection.
pub async fn get_staff_schedule(
    Path(staff_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /api/staff/{}/schedule", staff_id);
    respond(s.db.staff_schedule(&staff_id), "fetch staff schedule")
}
