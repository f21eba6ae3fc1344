use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::Player;

pub fn insert_player(conn: &mut DbConn, name: &str, team_id: Option<i64>) -> Result<Player> {
    let sql = "INSERT INTO players (name, team_id) VALUES (?1, ?2) RETURNING id, name, team_id, created_at";

    conn.query_row(sql, params![name, team_id], parse_player_row)
        .context("Failed to insert new player")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Player>> {
    let sql = "SELECT id, name, team_id, created_at FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        team_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}
