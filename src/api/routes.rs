use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    draws::{generate_draw, get_draw},
    entries::{create_entry, deactivate_entries, list_entries},
    matches::{finish_match, get_match, pause_match, resume_match, revert_match, start_match},
    points::{add_point, undo_point},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tournaments/:id/draw", post(generate_draw).get(get_draw))
        .route("/api/tournaments/:id/entries", get(list_entries).post(create_entry))
        .route("/api/tournaments/:id/entries/deactivate", post(deactivate_entries))
        .route("/api/matches/:id", get(get_match))
        .route("/api/matches/:id/start", post(start_match))
        .route("/api/matches/:id/pause", post(pause_match))
        .route("/api/matches/:id/resume", post(resume_match))
        .route("/api/matches/:id/finish", post(finish_match))
        .route("/api/matches/:id/revert", post(revert_match))
        .route("/api/matches/:id/points", post(add_point))
        .route("/api/matches/:id/points/undo", post(undo_point))
        .with_state(state)
}
