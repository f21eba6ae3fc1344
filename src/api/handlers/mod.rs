use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::settings::AppConfig;
use crate::errors::ServiceError;

pub mod draws;
pub mod entries;
pub mod matches;
pub mod points;

pub struct AppState {
    pub pool: Pool<SqliteConnectionManager>,
    pub config: AppConfig,
}

/// Acting user taken from the `X-User-Id` header; capability checks run
/// against the store afterwards.
pub fn acting_user(headers: &HeaderMap) -> Option<i64> {
    headers.get("X-User-Id")?.to_str().ok()?.parse().ok()
}

/// Maps service failure kinds onto status codes. The services themselves
/// never see HTTP.
pub fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict { .. } => StatusCode::CONFLICT,
        ServiceError::Dependency { .. } => {
            log::error!("Store failure: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, err.to_string()).into_response()
}
