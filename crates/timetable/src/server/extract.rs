//! `Json` and `Query` extractors that reject with the API's JSON error body
//! instead of axum's plain text.

use axum::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use tracing::warn;

use crate::server::types::ApiErrorType;

/// A JSON request body.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiErrorType;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!("Rejected request body: {}", rejection.body_text());
                Err(ApiErrorType::from((
                    rejection.status(),
                    "Invalid request body",
                    Some(rejection.body_text()),
                )))
            }
        }
    }
}

/// Query string parameters.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiErrorType;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!("Rejected query string: {}", rejection.body_text());
                Err(ApiErrorType::from((
                    rejection.status(),
                    "Invalid query string",
                    Some(rejection.body_text()),
                )))
            }
        }
    }
}
