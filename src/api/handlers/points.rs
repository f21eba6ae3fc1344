use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::matches::require_umpire;
use super::{error_response, AppState};
use crate::api::models::{AddPointRequest, PointResponse, UndoPointRequest};
use crate::services::scoring::ScoringService;

pub async fn add_point(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<AddPointRequest>,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    if let Err(denied) = require_umpire(&mut conn, &headers, match_id) {
        return denied;
    }

    let service = ScoringService::new(state.config.scoring.clone());
    match service.add_point(
        &mut conn,
        match_id,
        req.point_type,
        &req.client_key.to_string(),
        req.expected_version,
    ) {
        Ok(outcome) => Json(PointResponse::from(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn undo_point(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    headers: HeaderMap,
    body: Option<Json<UndoPointRequest>>,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    if let Err(denied) = require_umpire(&mut conn, &headers, match_id) {
        return denied;
    }

    let expected_version = body.and_then(|Json(req)| req.expected_version);

    let service = ScoringService::new(state.config.scoring.clone());
    match service.undo_last_point(&mut conn, match_id, expected_version) {
        Ok(outcome) => Json(PointResponse::from(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}
