use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::{NewTimetableEntry, TimetableFilter};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// POST /api/timetable
///
/// Stores the entry as given. Referenced slots, subjects, staff and
/// classes are not looked up, and clashes with other entries are allowed.
pub async fn post_timetable_entry(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewTimetableEntry>,
) -> Response {
    info!(
        "POST /api/timetable ({} {} {} {})",
        body.academic_year, body.program, body.section, body.day_of_week
    );

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_timetable_entry(body), "create timetable entry")
}

/// GET /api/timetable
///
/// Query parameters (all optional, combined with AND):
/// - `academic_year`, `program`, `year`, `semester`, `section`, `class_id`
pub async fn get_timetable(
    State(s): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<TimetableFilter>,
) -> Response {
    info!("GET /api/timetable ({:?})", filter);
    respond(s.db.list_timetable_entries(&filter), "fetch timetable")
}

/// DELETE /api/timetable/:entry_id
pub async fn delete_timetable_entry(
    Path(entry_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/timetable/{}", entry_id);
    respond_deleted(
        s.db.delete_timetable_entry(&entry_id),
        "Timetable entry",
        &entry_id,
    )
}
