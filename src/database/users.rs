use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::User;

pub fn insert_user(conn: &mut DbConn, name: &str, is_admin: bool) -> Result<User> {
    let sql = "INSERT INTO users (name, is_admin) VALUES (?1, ?2) RETURNING id, name, is_admin, created_at";

    conn.query_row(sql, params![name, is_admin], parse_user_row)
        .context("Failed to insert new user")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<User>> {
    let sql = "SELECT id, name, is_admin, created_at FROM users WHERE id = ?1";

    conn.query_row(sql, params![id], parse_user_row)
        .optional()
        .context("Failed to query user by id")
}

pub fn grant_tournament_admin(conn: &mut DbConn, user_id: i64, tournament_id: i64) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_admins (user_id, tournament_id) VALUES (?1, ?2)";

    conn.execute(sql, params![user_id, tournament_id])
        .context("Failed to grant tournament admin")
        .map(|_| ())
}

pub fn grant_umpire(conn: &mut DbConn, user_id: i64, tournament_id: i64) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO tournament_umpires (user_id, tournament_id) VALUES (?1, ?2)";

    conn.execute(sql, params![user_id, tournament_id])
        .context("Failed to grant umpire")
        .map(|_| ())
}

pub fn has_tournament_admin_grant(
    conn: &mut DbConn,
    user_id: i64,
    tournament_id: i64,
) -> Result<bool> {
    let sql = "SELECT 1 FROM tournament_admins WHERE user_id = ?1 AND tournament_id = ?2";

    let row: Option<i64> = conn
        .query_row(sql, params![user_id, tournament_id], |r| r.get(0))
        .optional()
        .context("Failed to query tournament admin grant")?;

    Ok(row.is_some())
}

pub fn has_umpire_grant(conn: &mut DbConn, user_id: i64, tournament_id: i64) -> Result<bool> {
    let sql = "SELECT 1 FROM tournament_umpires WHERE user_id = ?1 AND tournament_id = ?2";

    let row: Option<i64> = conn
        .query_row(sql, params![user_id, tournament_id], |r| r.get(0))
        .optional()
        .context("Failed to query umpire grant")?;

    Ok(row.is_some())
}

pub fn list_umpire_ids(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<i64>> {
    let sql = "SELECT user_id FROM tournament_umpires WHERE tournament_id = ?1 ORDER BY user_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        is_admin: row.get(2)?,
        created_at: row.get(3)?,
    })
}
