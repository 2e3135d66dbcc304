use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::{middleware as mw, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::server::endpoints::{
    auth, classes, departments, staff, status, subjects, time_slots, timetable,
};
use crate::server::middleware::session_validator;
use crate::types::AppState;

mod endpoints;
mod extract;
mod middleware;
mod types;
mod util;

/// Every route is served under this prefix.
pub const API_PREFIX: &str = "/api";

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints require a valid session
    let session_router = Router::new()
        .route("/auth/me", get(auth::get_me))
        .route(
            "/departments",
            get(departments::get_departments).post(departments::post_department),
        )
        .route(
            "/departments/:department_id",
            delete(departments::delete_department),
        )
        .route("/staff", get(staff::get_staff).post(staff::post_staff))
        .route("/staff/:staff_id", delete(staff::delete_staff))
        .route("/staff/:staff_id/schedule", get(staff::get_staff_schedule))
        .route(
            "/subjects",
            get(subjects::get_subjects).post(subjects::post_subject),
        )
        .route("/subjects/:subject_id", delete(subjects::delete_subject))
        .route("/classes", get(classes::get_classes).post(classes::post_class))
        .route("/classes/:class_id", delete(classes::delete_class))
        .route(
            "/time-slots",
            get(time_slots::get_time_slots).post(time_slots::post_time_slot),
        )
        .route("/time-slots/:slot_id", delete(time_slots::delete_time_slot))
        .route(
            "/timetable",
            get(timetable::get_timetable).post(timetable::post_timetable_entry),
        )
        .route(
            "/timetable/:entry_id",
            delete(timetable::delete_timetable_entry),
        )
        .route_layer(mw::from_fn_with_state(
            app_state.clone(),
            session_validator::require_session,
        ));

    // Open router: health and the endpoints that hand out or end sessions
    let open_router = Router::new()
        .route("/health", get(status::get_health))
        .route("/auth/login", post(auth::post_login))
        .route("/auth/session", post(auth::post_session))
        .route("/auth/logout", post(auth::post_logout));

    Router::new()
        .nest(API_PREFIX, open_router.merge(session_router))
        .with_state(app_state)
}

/// Wraps the router with request tracing and CORS for the given origins.
///
/// A `*` origin mirrors the caller's origin, since browsers refuse a
/// wildcard when credentials are allowed.
pub fn with_http_layers(router: Router, cors_origins: &[String]) -> Router {
    let allow_origin = if cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(cors_origins.iter().filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        }))
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityClient, SessionToken};
    use crate::config::Config;
    use crate::db::TimetableDb;
    use axum::body::{to_bytes, Body};
    use crate::auth::{spawn_provider, SESSION_ID_HEADER};
    use crate::config::IdentityConfig;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE,
    };
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        state_with(Config::default())
    }

    fn state_with(config: Config) -> Arc<AppState> {
        let config = Config {
            database_path: ":memory:".to_string(),
            ..config
        };
        let db = TimetableDb::open(&config.database_path).unwrap();
        let identity = IdentityClient::new(&config.identity).unwrap();
        Arc::new(AppState::new(&config, db, identity))
    }

    /// Sends a request and returns the status, `Set-Cookie` header and JSON body.
    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cookie, json)
    }

    /// Logs in through the API and returns the session token from the cookie.
    async fn login(router: &Router) -> String {
        let (status, cookie, body) = send(
            router,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "test.user@example.com", "name": "Test User" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["user_id"].as_str().unwrap().starts_with("user_"));

        let cookie = cookie.unwrap();
        assert!(cookie.contains("HttpOnly"));
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("session_token="))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_protected_endpoints_require_session() {
        let router = create_router(test_state());

        let protected = [
            (Method::GET, "/api/auth/me"),
            (Method::GET, "/api/departments"),
            (Method::POST, "/api/departments"),
            (Method::DELETE, "/api/departments/dept_1"),
            (Method::GET, "/api/staff"),
            (Method::POST, "/api/staff"),
            (Method::DELETE, "/api/staff/staff_1"),
            (Method::GET, "/api/staff/staff_1/schedule"),
            (Method::GET, "/api/subjects"),
            (Method::POST, "/api/subjects"),
            (Method::DELETE, "/api/subjects/subj_1"),
            (Method::GET, "/api/classes"),
            (Method::POST, "/api/classes"),
            (Method::DELETE, "/api/classes/class_1"),
            (Method::GET, "/api/time-slots"),
            (Method::POST, "/api/time-slots"),
            (Method::DELETE, "/api/time-slots/slot_1"),
            (Method::GET, "/api/timetable"),
            (Method::POST, "/api/timetable"),
            (Method::DELETE, "/api/timetable/entry_1"),
        ];

        for (method, uri) in protected {
            let (status, _, body) = send(&router, method.clone(), uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["detail"], "Not authenticated");

            let (status, _, body) =
                send(&router, method.clone(), uri, Some("session_bogus"), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["detail"], "Invalid session");
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let state = test_state();
        let router = create_router(state.clone());

        let token = SessionToken::generate();
        let profile = crate::db::UserProfile {
            email: "old@example.com".to_string(),
            name: "Old Session".to_string(),
            picture: None,
        };
        crate::auth::start_session(&state.db, &profile, &token, chrono::Duration::hours(-1))
            .unwrap();

        let (status, _, body) =
            send(&router, Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Session expired");
    }

    #[tokio::test]
    async fn test_login_me_logout() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let (status, _, me) = send(&router, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "test.user@example.com");
        assert!(me["created_at"].is_string());

        // Session cookie works as well as the bearer header
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(COOKIE, format!("session_token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, cookie, body) =
            send(&router, Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");
        assert!(cookie.unwrap().contains("Max-Age=0"));

        let (status, _, _) = send(&router, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_exchange_requires_header() {
        let router = create_router(test_state());
        let (status, _, body) = send(&router, Method::POST, "/api/auth/session", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Missing X-Session-ID header");
    }

    /// Posts a provider session id to the exchange endpoint.
    async fn exchange(router: &Router, session_id: &str) -> (StatusCode, Option<String>, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/session")
            .header(SESSION_ID_HEADER, session_id)
            .body(Body::empty())
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cookie, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_session_exchange_with_provider() {
        let state = state_with(Config {
            identity: IdentityConfig {
                session_data_url: spawn_provider().await,
                timeout_secs: 5,
            },
            ..Config::default()
        });
        let router = create_router(state);

        let (status, cookie, body) = exchange(&router, "good-id").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "grace@example.edu");
        assert_eq!(body["picture"], "https://img.example.edu/grace.png");

        let cookie = cookie.unwrap();
        assert!(cookie.starts_with("session_token=provider_token_1;"));
        assert!(cookie.contains("HttpOnly"));

        // The provider's token is now a local session
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(COOKIE, "session_token=provider_token_1")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let me: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(me["user_id"], body["user_id"]);
        assert_eq!(me["name"], "Grace Hopper");

        // Exchanging again keeps the same user
        let (status, _, again) = exchange(&router, "good-id").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["user_id"], body["user_id"]);

        let (status, cookie, body) = exchange(&router, "stale-id").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid session ID");
        assert!(cookie.is_none());

        let (status, _, body) = exchange(&router, "garbled-id").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Identity provider error");
    }

    /// Sends a CORS preflight for `POST /api/departments` from `origin`.
    async fn preflight(router: &Router, origin: &str) -> axum::http::HeaderMap {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/departments")
            .header(ORIGIN, origin)
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_cors_wildcard_mirrors_origin() {
        let router = with_http_layers(create_router(test_state()), &["*".to_string()]);

        let headers = preflight(&router, "http://localhost:3000").await;
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let request = Request::builder()
            .uri("/api/health")
            .header(ORIGIN, "https://timetable.example.edu")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://timetable.example.edu"
        );
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let origins = ["https://timetable.example.edu".to_string()];
        let router = with_http_layers(create_router(test_state()), &origins);

        let headers = preflight(&router, "https://timetable.example.edu").await;
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://timetable.example.edu"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let headers = preflight(&router, "http://localhost:3000").await;
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_malformed_input_gets_error_body() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/departments",
            Some(&token),
            Some(json!({ "name": "Computer Science" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Invalid request body");
        assert!(body["context"].as_str().unwrap().contains("code"));

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/timetable?year=second",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid query string");

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/timetable?year=&section=",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_department_crud() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let (status, _, list) =
            send(&router, Method::GET, "/api/departments", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([]));

        let (status, _, created) = send(
            &router,
            Method::POST,
            "/api/departments",
            Some(&token),
            Some(json!({
                "name": "Computer Science",
                "code": "CS",
                "description": "Computer Science Department"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let dept_id = created["department_id"].as_str().unwrap().to_string();
        assert!(dept_id.starts_with("dept_"));
        assert!(created["created_at"].is_string());

        let (_, _, list) = send(&router, Method::GET, "/api/departments", Some(&token), None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["department_id"], created["department_id"]);
        assert_eq!(list[0]["code"], "CS");

        let uri = format!("/api/departments/{dept_id}");
        let (status, _, body) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Department deleted successfully");

        let (status, _, body) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Department not found");
    }

    #[tokio::test]
    async fn test_delete_unknown_ids_yield_404() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let cases = [
            ("/api/departments/dept_unknown", "Department not found"),
            ("/api/staff/staff_unknown", "Staff not found"),
            ("/api/subjects/subj_unknown", "Subject not found"),
            ("/api/classes/class_unknown", "Class not found"),
            ("/api/time-slots/slot_unknown", "Time slot not found"),
            ("/api/timetable/entry_unknown", "Timetable entry not found"),
        ];

        for (uri, detail) in cases {
            let (status, _, body) = send(&router, Method::DELETE, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["detail"], detail);
        }
    }

    #[tokio::test]
    async fn test_blank_field_is_rejected() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/classes",
            Some(&token),
            Some(json!({ "name": "  ", "department_id": "dept_1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["context"], "`name` must not be empty");
    }

    #[tokio::test]
    async fn test_staff_and_subject_filters() {
        let router = create_router(test_state());
        let token = login(&router).await;

        for (name, dept) in [("John Doe", "dept_a"), ("Jane Roe", "dept_b")] {
            let (status, _, _) = send(
                &router,
                Method::POST,
                "/api/staff",
                Some(&token),
                Some(json!({
                    "name": name,
                    "email": "someone@example.com",
                    "department_id": dept,
                    "designation": "Professor"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, _, staff) = send(
            &router,
            Method::GET,
            "/api/staff?department_id=dept_b",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(staff.as_array().unwrap().len(), 1);
        assert_eq!(staff[0]["name"], "Jane Roe");

        let (status, _, subject) = send(
            &router,
            Method::POST,
            "/api/subjects",
            Some(&token),
            Some(json!({
                "code": "CS101",
                "name": "Data Structures",
                "credits": 4,
                "department_id": "dept_a"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(subject["subject_type"], "REGULAR");
        assert_eq!(subject["credits"], 4);
    }

    #[tokio::test]
    async fn test_time_slots_are_seeded() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let (status, _, slots) =
            send(&router, Method::GET, "/api/time-slots", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let slots = slots.as_array().unwrap().clone();
        assert_eq!(slots.len(), 8);
        assert!(slots.iter().any(|s| s["slot_type"] == "CLASS"));
        assert!(slots
            .iter()
            .any(|s| s["slot_type"] == "BREAK" || s["slot_type"] == "LUNCH"));

        let (_, _, again) = send(&router, Method::GET, "/api/time-slots", Some(&token), None).await;
        assert_eq!(again, Value::Array(slots));
    }

    #[tokio::test]
    async fn test_timetable_filters_and_staff_schedule() {
        let router = create_router(test_state());
        let token = login(&router).await;

        let entries = [
            ("2025-2026", "B.Tech", "A", Some("staff_1")),
            ("2025-2026", "B.Tech", "B", Some("staff_1")),
            ("2025-2026", "M.Tech", "A", Some("staff_2")),
            ("2024-2025", "B.Tech", "A", None),
        ];
        for (academic_year, program, section, staff_id) in entries {
            let (status, _, created) = send(
                &router,
                Method::POST,
                "/api/timetable",
                Some(&token),
                Some(json!({
                    "academic_year": academic_year,
                    "program": program,
                    "year": 1,
                    "semester": "I",
                    "section": section,
                    "day_of_week": "Monday",
                    "slot_id": "slot_000000000001",
                    "staff_id": staff_id
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(created["entry_type"], "CLASS");
        }

        let (_, _, filtered) = send(
            &router,
            Method::GET,
            "/api/timetable?academic_year=2025-2026&program=B.Tech&section=A",
            Some(&token),
            None,
        )
        .await;
        let filtered = filtered.as_array().unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["academic_year"], "2025-2026");
        assert_eq!(filtered[0]["program"], "B.Tech");
        assert_eq!(filtered[0]["section"], "A");

        let (_, _, all) = send(&router, Method::GET, "/api/timetable", Some(&token), None).await;
        assert_eq!(all.as_array().unwrap().len(), 4);

        let (status, _, schedule) = send(
            &router,
            Method::GET,
            "/api/staff/staff_1/schedule",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let schedule = schedule.as_array().unwrap();
        assert_eq!(schedule.len(), 2);
        assert!(schedule.iter().all(|e| e["staff_id"] == "staff_1"));
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let router = with_http_layers(create_router(test_state()), &["*".to_string()]);
        let (status, _, body) = send(&router, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
