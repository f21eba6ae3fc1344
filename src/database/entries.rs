use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::Entry;
use crate::domain::models::EntryKind;

const ENTRY_COLUMNS: &str =
    "id, tournament_id, entry_kind, team_id, seed_rank, group_key, active, created_at";

pub fn insert_entry(
    conn: &mut DbConn,
    tournament_id: i64,
    entry_kind: EntryKind,
    team_id: Option<i64>,
    seed_rank: Option<i32>,
    group_key: Option<&str>,
) -> Result<Entry> {
    let sql = format!(
        "INSERT INTO entries (tournament_id, entry_kind, team_id, seed_rank, group_key) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {ENTRY_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![tournament_id, entry_kind, team_id, seed_rank, group_key],
        parse_entry_row,
    )
    .context("Failed to insert new entry")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Entry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_entry_row)
        .optional()
        .context("Failed to query entry by id")
}

pub fn list_active(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE tournament_id = ?1 AND active = 1 ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_active_by_kind(
    conn: &mut DbConn,
    tournament_id: i64,
    entry_kind: EntryKind,
) -> Result<Vec<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE tournament_id = ?1 AND entry_kind = ?2 AND active = 1 ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id, entry_kind], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn find_active_by_team(
    conn: &mut DbConn,
    tournament_id: i64,
    team_id: i64,
) -> Result<Option<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE tournament_id = ?1 AND team_id = ?2 AND active = 1"
    );

    conn.query_row(&sql, params![tournament_id, team_id], parse_entry_row)
        .optional()
        .context("Failed to query entry by team")
}

/// Replace-import semantics: the previous registration set is retired, not
/// deleted, since placed brackets keep referencing it by value.
pub fn deactivate_all(conn: &mut DbConn, tournament_id: i64) -> Result<usize> {
    let sql = "UPDATE entries SET active = 0 WHERE tournament_id = ?1 AND active = 1";

    conn.execute(sql, params![tournament_id])
        .context("Failed to deactivate entries")
}

fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        entry_kind: row.get(2)?,
        team_id: row.get(3)?,
        seed_rank: row.get(4)?,
        group_key: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
    })
}
