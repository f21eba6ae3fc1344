use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::Tournament;
use crate::domain::models::TournamentFormat;

pub fn insert_tournament(
    conn: &mut DbConn,
    name: &str,
    format: TournamentFormat,
    games_to_win: i32,
) -> Result<Tournament> {
    let sql = "INSERT INTO tournaments (name, format, games_to_win) VALUES (?1, ?2, ?3) RETURNING id, name, format, games_to_win, created_at";

    conn.query_row(sql, params![name, format, games_to_win], parse_tournament_row)
        .context("Failed to insert new tournament")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Tournament>> {
    let sql = "SELECT id, name, format, games_to_win, created_at FROM tournaments WHERE id = ?1";

    conn.query_row(sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        format: row.get(2)?,
        games_to_win: row.get(3)?,
        created_at: row.get(4)?,
    })
}
