use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::Point;
use crate::domain::models::PointKind;

const POINT_COLUMNS: &str = "id, match_id, point_type, client_key, undone, recorded_at";

pub fn insert_point(
    conn: &mut DbConn,
    match_id: i64,
    point_type: PointKind,
    client_key: &str,
) -> Result<Point> {
    let sql = format!(
        "INSERT INTO points (match_id, point_type, client_key) VALUES (?1, ?2, ?3) RETURNING {POINT_COLUMNS}"
    );

    conn.query_row(&sql, params![match_id, point_type, client_key], parse_point_row)
        .context("Failed to insert new point")
}

/// Non-undone points in receipt order. The aggregate score is a fold over
/// exactly this stream.
pub fn list_live_by_match(conn: &mut DbConn, match_id: i64) -> Result<Vec<Point>> {
    let sql = format!(
        "SELECT {POINT_COLUMNS} FROM points WHERE match_id = ?1 AND undone = 0 ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_point_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn find_by_client_key(
    conn: &mut DbConn,
    match_id: i64,
    client_key: &str,
) -> Result<Option<Point>> {
    let sql = format!("SELECT {POINT_COLUMNS} FROM points WHERE match_id = ?1 AND client_key = ?2");

    conn.query_row(&sql, params![match_id, client_key], parse_point_row)
        .optional()
        .context("Failed to query point by client key")
}

pub fn find_last_live(conn: &mut DbConn, match_id: i64) -> Result<Option<Point>> {
    let sql = format!(
        "SELECT {POINT_COLUMNS} FROM points WHERE match_id = ?1 AND undone = 0 ORDER BY id DESC LIMIT 1"
    );

    conn.query_row(&sql, params![match_id], parse_point_row)
        .optional()
        .context("Failed to query last live point")
}

/// Soft-undo. Point rows are never deleted.
pub fn mark_undone(conn: &mut DbConn, point_id: i64) -> Result<()> {
    let sql = "UPDATE points SET undone = 1 WHERE id = ?1";

    conn.execute(sql, params![point_id])
        .context("Failed to mark point undone")
        .map(|_| ())
}

fn parse_point_row(row: &rusqlite::Row) -> rusqlite::Result<Point> {
    Ok(Point {
        id: row.get(0)?,
        match_id: row.get(1)?,
        point_type: row.get(2)?,
        client_key: row.get(3)?,
        undone: row.get(4)?,
        recorded_at: row.get(5)?,
    })
}
