use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{acting_user, AppState};
use crate::api::models::{CreateEntryRequest, EntryResponse};
use crate::auth;
use crate::database;
use crate::database::models::Entry;

pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
) -> Response {
    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match database::entries::list_active(&mut conn, tournament_id) {
        Ok(entries) => {
            let items: Vec<EntryResponse> = entries.into_iter().map(entry_response).collect();
            Json(items).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {e}")).into_response(),
    }
}

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateEntryRequest>,
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

    if let Some(player_ids) = &req.player_ids {
        if player_ids.is_empty() || player_ids.len() > 2 {
            return (StatusCode::BAD_REQUEST, "playerIds must hold one or two ids").into_response();
        }
    }

    let entry = match database::entries::insert_entry(
        &mut conn,
        tournament_id,
        req.entry_kind,
        req.team_id,
        req.seed_rank,
        req.group_key.as_deref(),
    ) {
        Ok(entry) => entry,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert Error: {e}")).into_response()
        }
    };

    if let Some(player_ids) = &req.player_ids {
        let player2_id = player_ids.get(1).copied();
        if let Err(e) =
            database::pairs::insert_pair(&mut conn, entry.id, player_ids[0], player2_id)
        {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert Error: {e}")).into_response();
        }
    }

    (StatusCode::CREATED, Json(entry_response(entry))).into_response()
}

/// Replace-import support: retires the current registration set so a new
/// one can be created. Brackets already generated keep their entry ids.
pub async fn deactivate_entries(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    headers: HeaderMap,
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

    match database::entries::deactivate_all(&mut conn, tournament_id) {
        Ok(count) => Json(serde_json::json!({ "deactivated": count })).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Update Error: {e}")).into_response(),
    }
}

fn entry_response(entry: Entry) -> EntryResponse {
    EntryResponse {
        id: entry.id,
        entry_kind: entry.entry_kind,
        team_id: entry.team_id,
        seed_rank: entry.seed_rank,
        group_key: entry.group_key,
        active: entry.active,
    }
}
