use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::auth::{self, SessionToken};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Rejects requests that do not carry a valid session. On success the
/// authenticated [`User`](crate::db::User) is added to the request
/// extensions for handlers to pick up.
pub async fn require_session(
    State(s): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = SessionToken::from_headers(req.headers());

    match auth::authenticate(&s.db, token.as_ref()) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            warn!("{} {} rejected: {}", req.method(), req.uri().path(), e);
            ApiErrorType::from(e).into_response()
        }
    }
}
