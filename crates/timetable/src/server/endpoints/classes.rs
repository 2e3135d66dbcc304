use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::{DepartmentFilter, NewClass};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// POST /api/classes
pub async fn post_class(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewClass>,
) -> Response {
    info!("POST /api/classes ({})", body.name);

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_class(body), "create class")
}

/// GET /api/classes
pub async fn get_classes(
    State(s): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<DepartmentFilter>,
) -> Response {
    info!("GET /api/classes (department_id={:?})", filter.department_id);
    respond(s.db.list_classes(&filter), "fetch classes")
}

/// DELETE /api/classes/:class_id
pub async fn delete_class(
    Path(class_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/classes/{}", class_id);
    respond_deleted(s.db.delete_class(&class_id), "Class", &class_id)
}
