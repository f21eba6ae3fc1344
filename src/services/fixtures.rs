//! Shared builders for service tests: real schema, single-connection
//! in-memory pool.

use crate::config::settings::DrawSettings;
use crate::database::models::{Entry, Team, Tournament};
use crate::database::{self, DbConn, DbPool};
use crate::domain::models::{DrawSummary, EntryKind, TournamentFormat, UmpirePolicy};
use crate::services::draw::DrawService;

pub fn pool() -> DbPool {
    database::connection::create_test_pool()
}

pub fn singles_tournament(conn: &mut DbConn) -> Tournament {
    database::tournaments::insert_tournament(conn, "City Open", TournamentFormat::Singles, 1)
        .expect("tournament")
}

pub fn team_tournament(conn: &mut DbConn) -> Tournament {
    database::tournaments::insert_tournament(conn, "Prefecture Team Cup", TournamentFormat::Team3, 2)
        .expect("tournament")
}

/// Player + entry + registered singles pair in one go.
pub fn add_singles_entry(
    conn: &mut DbConn,
    tournament_id: i64,
    name: &str,
    seed_rank: Option<i32>,
    group_key: Option<&str>,
) -> Entry {
    let player = database::players::insert_player(conn, name, None).expect("player");
    let entry = database::entries::insert_entry(
        conn,
        tournament_id,
        EntryKind::Singles,
        None,
        seed_rank,
        group_key,
    )
    .expect("entry");
    database::pairs::insert_pair(conn, entry.id, player.id, None).expect("pair");
    entry
}

/// Singles tournament with `entry_count` registered entries and a
/// generated draw.
pub fn singles_draw(conn: &mut DbConn, entry_count: usize) -> (Tournament, DrawSummary) {
    let tournament = singles_tournament(conn);
    for i in 1..=entry_count {
        add_singles_entry(conn, tournament.id, &format!("Player {i}"), None, None);
    }
    let summary = DrawService::new(DrawSettings::default())
        .generate(conn, tournament.id, UmpirePolicy::None)
        .expect("draw");
    (tournament, summary)
}

/// Team with a three-player roster registered as individual pairs under the
/// team entry.
pub fn add_team_entry(
    conn: &mut DbConn,
    tournament_id: i64,
    name: &str,
    region: Option<&str>,
) -> (Team, Entry) {
    let team = database::teams::insert_team(conn, tournament_id, name, region).expect("team");
    let entry = database::entries::insert_entry(
        conn,
        tournament_id,
        EntryKind::Team,
        Some(team.id),
        None,
        region,
    )
    .expect("entry");

    for i in 1..=3 {
        let player =
            database::players::insert_player(conn, &format!("{name} member {i}"), Some(team.id))
                .expect("player");
        database::pairs::insert_pair(conn, entry.id, player.id, None).expect("pair");
    }

    (team, entry)
}
