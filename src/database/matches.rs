use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::{Match, NewMatch};
use crate::domain::models::MatchStatus;

const MATCH_COLUMNS: &str = "id, tournament_id, phase_id, round, slot_index, match_number, round_label, match_kind, status, version, parent_match_id, next_match_id, winner_source_match_a, winner_source_match_b, umpire_user_id, court, created_at";

pub fn insert_match(conn: &mut DbConn, new_match: &NewMatch) -> Result<Match> {
    let sql = format!(
        "INSERT INTO matches (tournament_id, phase_id, round, slot_index, match_number, round_label, match_kind, parent_match_id, umpire_user_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING {MATCH_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new_match.tournament_id,
            new_match.phase_id,
            new_match.round,
            new_match.slot_index,
            new_match.match_number,
            new_match.round_label,
            new_match.match_kind,
            new_match.parent_match_id,
            new_match.umpire_user_id,
        ],
        parse_match_row,
    )
    .context("Failed to insert new match")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Match>> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_match_row)
        .optional()
        .context("Failed to query match by id")
}

pub fn list_by_phase(conn: &mut DbConn, phase_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE phase_id = ?1 ORDER BY round, slot_index, id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![phase_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Bracket nodes only: child matches of team nodes are excluded.
pub fn list_bracket_by_phase(conn: &mut DbConn, phase_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE phase_id = ?1 AND parent_match_id IS NULL ORDER BY round, slot_index"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![phase_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_children(conn: &mut DbConn, parent_match_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE parent_match_id = ?1 ORDER BY match_number"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![parent_match_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_status(conn: &mut DbConn, id: i64, status: MatchStatus) -> Result<()> {
    let sql = "UPDATE matches SET status = ?2 WHERE id = ?1";

    conn.execute(sql, params![id, status])
        .context("Failed to update match status")
        .map(|_| ())
}

pub fn set_next_match_id(conn: &mut DbConn, id: i64, next_match_id: i64) -> Result<()> {
    let sql = "UPDATE matches SET next_match_id = ?2 WHERE id = ?1";

    conn.execute(sql, params![id, next_match_id])
        .context("Failed to set next match id")
        .map(|_| ())
}

/// Records which match feeds the given slot: slot 1 is source A, slot 2 is
/// source B.
pub fn set_winner_source(
    conn: &mut DbConn,
    id: i64,
    slot_number: i32,
    source_match_id: i64,
) -> Result<()> {
    let sql = match slot_number {
        1 => "UPDATE matches SET winner_source_match_a = ?2 WHERE id = ?1",
        2 => "UPDATE matches SET winner_source_match_b = ?2 WHERE id = ?1",
        _ => anyhow::bail!("Invalid slot number for winner source: {slot_number}"),
    };

    conn.execute(sql, params![id, source_match_id])
        .context("Failed to set winner source match")
        .map(|_| ())
}

pub fn assign_umpire(conn: &mut DbConn, id: i64, umpire_user_id: i64) -> Result<()> {
    let sql = "UPDATE matches SET umpire_user_id = ?2 WHERE id = ?1";

    conn.execute(sql, params![id, umpire_user_id])
        .context("Failed to assign umpire")
        .map(|_| ())
}

/// Compare-and-swap version advance. Returns false when another writer got
/// there first.
pub fn bump_version_guarded(conn: &mut DbConn, id: i64, expected_version: i64) -> Result<bool> {
    let sql = "UPDATE matches SET version = version + 1 WHERE id = ?1 AND version = ?2";

    let affected = conn
        .execute(sql, params![id, expected_version])
        .context("Failed to advance match version")?;

    Ok(affected == 1)
}

/// Matches that have started play: in progress or paused.
pub fn count_started(conn: &mut DbConn, tournament_id: i64) -> Result<i64> {
    let sql = "SELECT COUNT(*) FROM matches WHERE tournament_id = ?1 AND status IN ('inprogress', 'paused')";

    conn.query_row(sql, params![tournament_id], |r| r.get(0))
        .context("Failed to count started matches")
}

/// Finished matches decided by actual play. Walkover and bye completions
/// (`winning_reason != 'NORMAL'`) are excluded.
pub fn count_finished_with_real_result(conn: &mut DbConn, tournament_id: i64) -> Result<i64> {
    let sql = "
        SELECT COUNT(*)
        FROM matches m
        JOIN match_scores s ON s.match_id = m.id
        WHERE m.tournament_id = ?1 AND m.status = 'finished' AND s.winning_reason = 'NORMAL'
    ";

    conn.query_row(sql, params![tournament_id], |r| r.get(0))
        .context("Failed to count finished matches with real results")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        phase_id: row.get(2)?,
        round: row.get(3)?,
        slot_index: row.get(4)?,
        match_number: row.get(5)?,
        round_label: row.get(6)?,
        match_kind: row.get(7)?,
        status: row.get(8)?,
        version: row.get(9)?,
        parent_match_id: row.get(10)?,
        next_match_id: row.get(11)?,
        winner_source_match_a: row.get(12)?,
        winner_source_match_b: row.get(13)?,
        umpire_user_id: row.get(14)?,
        court: row.get(15)?,
        created_at: row.get(16)?,
    })
}
