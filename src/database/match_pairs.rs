use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::MatchPair;

/// Updates the pair occupying `pair_number` if one exists, inserts it
/// otherwise. Winner propagation re-runs through here, so repeated calls
/// with the same arguments leave a single row.
pub fn upsert_pair(
    conn: &mut DbConn,
    match_id: i64,
    pair_number: i32,
    team_id: Option<i64>,
    player1_id: Option<i64>,
    player2_id: Option<i64>,
) -> Result<MatchPair> {
    if find_by_match_and_number(conn, match_id, pair_number)?.is_some() {
        let sql = "UPDATE match_pairs SET team_id = ?3, player1_id = ?4, player2_id = ?5 WHERE match_id = ?1 AND pair_number = ?2 RETURNING id, match_id, pair_number, team_id, player1_id, player2_id";

        return conn
            .query_row(
                sql,
                params![match_id, pair_number, team_id, player1_id, player2_id],
                parse_pair_row,
            )
            .context("Failed to update match pair");
    }

    let sql = "INSERT INTO match_pairs (match_id, pair_number, team_id, player1_id, player2_id) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id, match_id, pair_number, team_id, player1_id, player2_id";

    conn.query_row(
        sql,
        params![match_id, pair_number, team_id, player1_id, player2_id],
        parse_pair_row,
    )
    .context("Failed to insert new match pair")
}

pub fn find_by_match_and_number(
    conn: &mut DbConn,
    match_id: i64,
    pair_number: i32,
) -> Result<Option<MatchPair>> {
    let sql = "SELECT id, match_id, pair_number, team_id, player1_id, player2_id FROM match_pairs WHERE match_id = ?1 AND pair_number = ?2";

    conn.query_row(sql, params![match_id, pair_number], parse_pair_row)
        .optional()
        .context("Failed to query match pair")
}

pub fn list_by_match(conn: &mut DbConn, match_id: i64) -> Result<Vec<MatchPair>> {
    let sql = "SELECT id, match_id, pair_number, team_id, player1_id, player2_id FROM match_pairs WHERE match_id = ?1 ORDER BY pair_number";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_pair_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_pair_row(row: &rusqlite::Row) -> rusqlite::Result<MatchPair> {
    Ok(MatchPair {
        id: row.get(0)?,
        match_id: row.get(1)?,
        pair_number: row.get(2)?,
        team_id: row.get(3)?,
        player1_id: row.get(4)?,
        player2_id: row.get(5)?,
    })
}
