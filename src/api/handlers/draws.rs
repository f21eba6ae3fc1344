use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{acting_user, error_response, AppState};
use crate::api::models::{DrawSummaryResponse, DrawView, GenerateDrawRequest, MatchView};
use crate::auth;
use crate::database;
use crate::domain::models::UmpirePolicy;
use crate::services::draw::DrawService;

pub async fn generate_draw(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    headers: HeaderMap,
    body: Option<Json<GenerateDrawRequest>>,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let Some(user_id) = acting_user(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match auth::is_tournament_admin(&mut conn, user_id, tournament_id) {
        Ok(true) => {}
        Ok(false) => return StatusCode::FORBIDDEN.into_response(),
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Auth Error: {e}")).into_response()
        }
    }

    let umpire_policy = body
        .and_then(|Json(req)| req.umpire_policy)
        .unwrap_or(UmpirePolicy::None);

    let service = DrawService::new(state.config.draw.clone());
    match service.generate(&mut conn, tournament_id, umpire_policy) {
        Ok(summary) => Json(DrawSummaryResponse::from(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_draw(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let phases = match database::phases::list_by_tournament(&mut conn, tournament_id) {
        Ok(phases) => phases,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {e}")).into_response()
        }
    };
    let Some(phase) = phases.into_iter().last() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let match_rows = match database::matches::list_by_phase(&mut conn, phase.id) {
        Ok(rows) => rows,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {e}")).into_response()
        }
    };

    let mut matches = Vec::with_capacity(match_rows.len());
    for match_row in match_rows {
        let slots = database::match_slots::list_by_match(&mut conn, match_row.id);
        let pairs = database::match_pairs::list_by_match(&mut conn, match_row.id);
        let score = database::match_scores::find_by_match(&mut conn, match_row.id);
        match (slots, pairs, score) {
            (Ok(slots), Ok(pairs), Ok(score)) => {
                matches.push(MatchView::new(match_row, slots, pairs, score));
            }
            _ => {
                return (StatusCode::INTERNAL_SERVER_ERROR, "Query Error").into_response();
            }
        }
    }

    Json(DrawView {
        phase_id: phase.id,
        sequence: phase.sequence,
        games_to_win: phase.games_to_win,
        matches,
    })
    .into_response()
}
