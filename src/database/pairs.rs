use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::TournamentPair;

pub fn insert_pair(
    conn: &mut DbConn,
    entry_id: i64,
    player1_id: i64,
    player2_id: Option<i64>,
) -> Result<TournamentPair> {
    let sql = "INSERT INTO tournament_pairs (entry_id, player1_id, player2_id) VALUES (?1, ?2, ?3) RETURNING id, entry_id, player1_id, player2_id, created_at";

    conn.query_row(sql, params![entry_id, player1_id, player2_id], parse_pair_row)
        .context("Failed to insert new tournament pair")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<TournamentPair>> {
    let sql = "SELECT id, entry_id, player1_id, player2_id, created_at FROM tournament_pairs WHERE id = ?1";

    conn.query_row(sql, params![id], parse_pair_row)
        .optional()
        .context("Failed to query tournament pair by id")
}

pub fn list_by_entry(conn: &mut DbConn, entry_id: i64) -> Result<Vec<TournamentPair>> {
    let sql = "SELECT id, entry_id, player1_id, player2_id, created_at FROM tournament_pairs WHERE entry_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![entry_id], parse_pair_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Pairs registered under a team's active entries for a tournament.
pub fn list_for_team(
    conn: &mut DbConn,
    tournament_id: i64,
    team_id: i64,
) -> Result<Vec<TournamentPair>> {
    let sql = "
        SELECT p.id, p.entry_id, p.player1_id, p.player2_id, p.created_at
        FROM tournament_pairs p
        JOIN entries e ON p.entry_id = e.id
        WHERE e.tournament_id = ?1 AND e.team_id = ?2 AND e.active = 1
        ORDER BY p.id
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id, team_id], parse_pair_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Reverse lookup from a player line-up to the registered pair, across all
/// active entries of a tournament. Player order within the pair is
/// irrelevant.
pub fn find_in_tournament_matching(
    conn: &mut DbConn,
    tournament_id: i64,
    player1_id: i64,
    player2_id: Option<i64>,
) -> Result<Option<TournamentPair>> {
    let sql = "
        SELECT p.id, p.entry_id, p.player1_id, p.player2_id, p.created_at
        FROM tournament_pairs p
        JOIN entries e ON p.entry_id = e.id
        WHERE e.tournament_id = ?1 AND e.active = 1
        ORDER BY p.id
    ";

    let mut stmt = conn.prepare(sql)?;
    let pairs = stmt
        .query_map(params![tournament_id], parse_pair_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(pairs
        .into_iter()
        .find(|pair| same_players(pair, player1_id, player2_id)))
}

/// A team's pair matching the given player line-up, if one is registered.
/// Player order within the pair is irrelevant.
pub fn find_for_team_matching(
    conn: &mut DbConn,
    tournament_id: i64,
    team_id: i64,
    player1_id: i64,
    player2_id: Option<i64>,
) -> Result<Option<TournamentPair>> {
    let pairs = list_for_team(conn, tournament_id, team_id)?;

    Ok(pairs
        .into_iter()
        .find(|pair| same_players(pair, player1_id, player2_id)))
}

fn same_players(pair: &TournamentPair, player1_id: i64, player2_id: Option<i64>) -> bool {
    let mut registered = [Some(pair.player1_id), pair.player2_id];
    let mut wanted = [Some(player1_id), player2_id];
    registered.sort_unstable();
    wanted.sort_unstable();
    registered == wanted
}

fn parse_pair_row(row: &rusqlite::Row) -> rusqlite::Result<TournamentPair> {
    Ok(TournamentPair {
        id: row.get(0)?,
        entry_id: row.get(1)?,
        player1_id: row.get(2)?,
        player2_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}
