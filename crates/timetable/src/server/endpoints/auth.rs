//! Login, identity exchange, current user and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::{
    self, clear_session_cookie, session_cookie, AuthError, SessionData, SessionToken,
    SESSION_ID_HEADER,
};
use crate::db::{RequiredFields, User, UserProfile};
use crate::server::extract::ApiJson;
use crate::server::types::ApiErrorType;
use crate::server::util::check_required;
use crate::types::AppState;

/// Body of a local login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub name: String,
}

impl RequiredFields for LoginRequest {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("email", &self.email), ("name", &self.name)]
    }
}

/// Responds with the user's public profile and sets the session cookie.
fn session_response(s: &AppState, user: &User, token: &SessionToken) -> Response {
    let cookie = session_cookie(token, s.session_ttl, s.cookie_secure);
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(json!({
            "user_id": user.user_id,
            "email": user.email,
            "name": user.name,
            "picture": user.picture,
        })),
    )
        .into_response()
}

/// POST /api/auth/login
///
/// Signs in by email, creating the user on first login, and opens a new
/// session.
pub async fn post_login(
    State(s): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Response {
    info!("POST /api/auth/login ({})", body.email);

    if let Err(rejection) = check_required(&body) {
        return rejection;
    }

    let profile = UserProfile {
        email: body.email,
        name: body.name,
        picture: None,
    };
    let token = SessionToken::generate();

    match auth::start_session(&s.db, &profile, &token, s.session_ttl) {
        Ok(user) => session_response(&s, &user, &token),
        Err(e) => {
            error!("Login failed for {}: {}", profile.email, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Login error: {e}").as_str(),
                None,
            ))
            .into_response()
        }
    }
}

/// POST /api/auth/session
///
/// Exchanges the identity provider's one-time id (`X-Session-ID` header)
/// for a session on this server.
pub async fn post_session(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    info!("POST /api/auth/session");

    let session_id = match headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(id) => id.to_string(),
        None => return ApiErrorType::from(AuthError::MissingSessionId).into_response(),
    };

    let data: SessionData = match s.identity.exchange(&session_id).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Identity exchange failed: {}", e);
            return ApiErrorType::from(e).into_response();
        }
    };

    let profile = UserProfile {
        email: data.email,
        name: data.name,
        picture: data.picture,
    };
    let token = SessionToken::new(data.session_token);

    match auth::start_session(&s.db, &profile, &token, s.session_ttl) {
        Ok(user) => session_response(&s, &user, &token),
        Err(e) => {
            error!("Failed to open session for {}: {}", profile.email, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// GET /api/auth/me
pub async fn get_me(Extension(user): Extension<User>) -> Response {
    info!("GET /api/auth/me ({})", user.user_id);
    (StatusCode::OK, Json(user)).into_response()
}

/// POST /api/auth/logout
///
/// Always succeeds; an unknown or missing token simply has nothing to end.
pub async fn post_logout(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    info!("POST /api/auth/logout");

    if let Some(token) = SessionToken::from_headers(&headers) {
        if let Err(e) = auth::end_session(&s.db, &token) {
            error!("Failed to end session {}: {}", token, e);
            return ApiErrorType::from(e).into_response();
        }
    }

    (
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie())],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}
