use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::MatchSlot;
use crate::domain::models::SlotSource;

pub fn insert_slot(
    conn: &mut DbConn,
    match_id: i64,
    slot_number: i32,
    source_type: SlotSource,
    entry_id: Option<i64>,
    source_match_id: Option<i64>,
    placeholder: Option<&str>,
) -> Result<MatchSlot> {
    let sql = "INSERT INTO match_slots (match_id, slot_number, source_type, entry_id, source_match_id, placeholder) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id, match_id, slot_number, source_type, entry_id, source_match_id, placeholder";

    conn.query_row(
        sql,
        params![
            match_id,
            slot_number,
            source_type,
            entry_id,
            source_match_id,
            placeholder
        ],
        parse_slot_row,
    )
    .context("Failed to insert new match slot")
}

pub fn list_by_match(conn: &mut DbConn, match_id: i64) -> Result<Vec<MatchSlot>> {
    let sql = "SELECT id, match_id, slot_number, source_type, entry_id, source_match_id, placeholder FROM match_slots WHERE match_id = ?1 ORDER BY slot_number";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_slot_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_slot_row(row: &rusqlite::Row) -> rusqlite::Result<MatchSlot> {
    Ok(MatchSlot {
        id: row.get(0)?,
        match_id: row.get(1)?,
        slot_number: row.get(2)?,
        source_type: row.get(3)?,
        entry_id: row.get(4)?,
        source_match_id: row.get(5)?,
        placeholder: row.get(6)?,
    })
}
