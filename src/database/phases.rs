use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::Phase;

pub fn insert_phase(
    conn: &mut DbConn,
    tournament_id: i64,
    sequence: i32,
    games_to_win: i32,
) -> Result<Phase> {
    let sql = "INSERT INTO phases (tournament_id, sequence, games_to_win) VALUES (?1, ?2, ?3) RETURNING id, tournament_id, sequence, games_to_win, created_at";

    conn.query_row(
        sql,
        params![tournament_id, sequence, games_to_win],
        parse_phase_row,
    )
    .context("Failed to insert new phase")
}

pub fn list_by_tournament(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<Phase>> {
    let sql = "SELECT id, tournament_id, sequence, games_to_win, created_at FROM phases WHERE tournament_id = ?1 ORDER BY sequence";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_phase_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Removes a phase and everything hanging off its matches. Order matters:
/// leaf tables first, since the schema declares the references but deletes
/// are enforced here.
pub fn delete_cascade(conn: &mut DbConn, phase_id: i64) -> Result<()> {
    let by_match = [
        "DELETE FROM points WHERE match_id IN (SELECT id FROM matches WHERE phase_id = ?1)",
        "DELETE FROM match_scores WHERE match_id IN (SELECT id FROM matches WHERE phase_id = ?1)",
        "DELETE FROM match_pairs WHERE match_id IN (SELECT id FROM matches WHERE phase_id = ?1)",
        "DELETE FROM match_slots WHERE match_id IN (SELECT id FROM matches WHERE phase_id = ?1)",
        "DELETE FROM matches WHERE phase_id = ?1",
        "DELETE FROM phases WHERE id = ?1",
    ];

    for sql in by_match {
        conn.execute(sql, params![phase_id])
            .with_context(|| format!("Failed cascade delete for phase {phase_id}"))?;
    }

    Ok(())
}

fn parse_phase_row(row: &rusqlite::Row) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        sequence: row.get(2)?,
        games_to_win: row.get(3)?,
        created_at: row.get(4)?,
    })
}
