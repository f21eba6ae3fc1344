use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::Team;

pub fn insert_team(
    conn: &mut DbConn,
    tournament_id: i64,
    name: &str,
    region: Option<&str>,
) -> Result<Team> {
    let sql = "INSERT INTO teams (tournament_id, name, region) VALUES (?1, ?2, ?3) RETURNING id, tournament_id, name, region, created_at";

    conn.query_row(sql, params![tournament_id, name, region], parse_team_row)
        .context("Failed to insert new team")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Team>> {
    let sql = "SELECT id, tournament_id, name, region, created_at FROM teams WHERE id = ?1";

    conn.query_row(sql, params![id], parse_team_row)
        .optional()
        .context("Failed to query team by id")
}

fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        name: row.get(2)?,
        region: row.get(3)?,
        created_at: row.get(4)?,
    })
}
