use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::MatchScore;
use crate::domain::models::WinningReason;

const SCORE_COLUMNS: &str =
    "id, match_id, game_count_a, game_count_b, final_score, winner_id, winning_reason, ended_at";

pub fn find_by_match(conn: &mut DbConn, match_id: i64) -> Result<Option<MatchScore>> {
    let sql = format!("SELECT {SCORE_COLUMNS} FROM match_scores WHERE match_id = ?1");

    conn.query_row(&sql, params![match_id], parse_score_row)
        .optional()
        .context("Failed to query match score")
}

/// Score rows are created lazily: on the first point or on walkover
/// resolution.
pub fn get_or_create(conn: &mut DbConn, match_id: i64) -> Result<MatchScore> {
    if let Some(existing) = find_by_match(conn, match_id)? {
        return Ok(existing);
    }

    let sql = format!("INSERT INTO match_scores (match_id) VALUES (?1) RETURNING {SCORE_COLUMNS}");

    conn.query_row(&sql, params![match_id], parse_score_row)
        .context("Failed to insert new match score")
}

pub fn update_games(conn: &mut DbConn, match_id: i64, game_count_a: i32, game_count_b: i32) -> Result<()> {
    let sql = "UPDATE match_scores SET game_count_a = ?2, game_count_b = ?3 WHERE match_id = ?1";

    conn.execute(sql, params![match_id, game_count_a, game_count_b])
        .context("Failed to update game counts")
        .map(|_| ())
}

/// Sets the outcome fields. The first recorded end time wins, so replays of
/// the same finish leave the row unchanged.
pub fn set_winner(
    conn: &mut DbConn,
    match_id: i64,
    winner_id: i64,
    winning_reason: WinningReason,
    ended_at: NaiveDateTime,
) -> Result<()> {
    let sql = "UPDATE match_scores SET winner_id = ?2, winning_reason = ?3, ended_at = COALESCE(ended_at, ?4) WHERE match_id = ?1";

    conn.execute(sql, params![match_id, winner_id, winning_reason, ended_at])
        .context("Failed to set match winner")
        .map(|_| ())
}

pub fn set_final_score(conn: &mut DbConn, match_id: i64, final_score: &str) -> Result<()> {
    let sql = "UPDATE match_scores SET final_score = ?2 WHERE match_id = ?1";

    conn.execute(sql, params![match_id, final_score])
        .context("Failed to set final score")
        .map(|_| ())
}

/// Revert support: reopens the outcome while the point ledger stays intact.
pub fn clear_winner(conn: &mut DbConn, match_id: i64) -> Result<()> {
    let sql = "UPDATE match_scores SET winner_id = NULL, winning_reason = NULL, ended_at = NULL, final_score = NULL WHERE match_id = ?1";

    conn.execute(sql, params![match_id])
        .context("Failed to clear match winner")
        .map(|_| ())
}

fn parse_score_row(row: &rusqlite::Row) -> rusqlite::Result<MatchScore> {
    Ok(MatchScore {
        id: row.get(0)?,
        match_id: row.get(1)?,
        game_count_a: row.get(2)?,
        game_count_b: row.get(3)?,
        final_score: row.get(4)?,
        winner_id: row.get(5)?,
        winning_reason: row.get(6)?,
        ended_at: row.get(7)?,
    })
}
