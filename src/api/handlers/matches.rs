use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{acting_user, error_response, AppState};
use crate::api::models::{FinishResponse, MatchActionResponse, MatchView};
use crate::auth;
use crate::database::models::Match;
use crate::database::{self, DbConn};
use crate::errors::ServiceResult;
use crate::services::match_flow::MatchFlowService;

pub async fn get_match(State(state): State<Arc<AppState>>, Path(match_id): Path<i64>) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let match_row = match database::matches::find_by_id(&mut conn, match_id) {
        Ok(Some(row)) => row,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {e}")).into_response()
        }
    };

    let slots = database::match_slots::list_by_match(&mut conn, match_id);
    let pairs = database::match_pairs::list_by_match(&mut conn, match_id);
    let score = database::match_scores::find_by_match(&mut conn, match_id);
    match (slots, pairs, score) {
        (Ok(slots), Ok(pairs), Ok(score)) => {
            Json(MatchView::new(match_row, slots, pairs, score)).into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Query Error").into_response(),
    }
}

pub async fn start_match(
    state: State<Arc<AppState>>,
    path: Path<i64>,
    headers: HeaderMap,
) -> Response {
    run_transition(state, path, headers, |flow, conn, id| flow.start_match(conn, id)).await
}

pub async fn pause_match(
    state: State<Arc<AppState>>,
    path: Path<i64>,
    headers: HeaderMap,
) -> Response {
    run_transition(state, path, headers, |flow, conn, id| flow.pause_match(conn, id)).await
}

pub async fn resume_match(
    state: State<Arc<AppState>>,
    path: Path<i64>,
    headers: HeaderMap,
) -> Response {
    run_transition(state, path, headers, |flow, conn, id| flow.resume_match(conn, id)).await
}

pub async fn revert_match(
    state: State<Arc<AppState>>,
    path: Path<i64>,
    headers: HeaderMap,
) -> Response {
    run_transition(state, path, headers, |flow, conn, id| {
        flow.revert_match_finish(conn, id)
    })
    .await
}

pub async fn finish_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    if let Err(denied) = require_umpire(&mut conn, &headers, match_id) {
        return denied;
    }

    match MatchFlowService::new().process_match_finish(&mut conn, match_id) {
        Ok(winner_id) => Json(FinishResponse {
            id: match_id,
            winner_id,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn run_transition<F>(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    headers: HeaderMap,
    transition: F,
) -> Response
where
    F: FnOnce(&MatchFlowService, &mut DbConn, i64) -> ServiceResult<Match>,
{
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    if let Err(denied) = require_umpire(&mut conn, &headers, match_id) {
        return denied;
    }

    match transition(&MatchFlowService::new(), &mut conn, match_id) {
        Ok(match_row) => Json(MatchActionResponse {
            id: match_row.id,
            status: match_row.status,
            version: match_row.version,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Umpire capability gate shared by the mutating match endpoints.
pub(super) fn require_umpire(
    conn: &mut DbConn,
    headers: &HeaderMap,
    match_id: i64,
) -> Result<(), Response> {
    let Some(user_id) = acting_user(headers) else {
        return Err(StatusCode::UNAUTHORIZED.into_response());
    };

    let match_row = match database::matches::find_by_id(conn, match_id) {
        Ok(Some(row)) => row,
        Ok(None) => return Err(StatusCode::NOT_FOUND.into_response()),
        Err(e) => {
            return Err(
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {e}")).into_response(),
            )
        }
    };

    match auth::is_umpire(conn, user_id, match_row.tournament_id, match_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::FORBIDDEN.into_response()),
        Err(e) => Err(
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Auth Error: {e}")).into_response(),
        ),
    }
}
