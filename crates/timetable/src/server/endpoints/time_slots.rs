use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::info;

use crate::db::NewTimeSlot;
use crate::server::extract::ApiJson;
use crate::server::util::{check_required, respond, respond_deleted};
use crate::types::AppState;

/// GET /api/time-slots
///
/// Returns the day's slots. The first read of an empty collection seeds
/// the default schedule.
pub async fn get_time_slots(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /api/time-slots");
    respond(s.db.list_time_slots(), "fetch time slots")
}

/// POST /api/time-slots
pub async fn post_time_slot(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewTimeSlot>,
) -> Response {
    info!(
        "POST /api/time-slots ({}-{} {})",
        body.start_time, body.end_time, body.slot_type
    );

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    respond(s.db.insert_time_slot(body), "create time slot")
}

/// DELETE /api/time-slots/:slot_id
pub async fn delete_time_slot(
    Path(slot_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /api/time-slots/{}", slot_id);
    respond_deleted(s.db.delete_time_slot(&slot_id), "Time slot", &slot_id)
}
