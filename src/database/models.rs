use chrono::NaiveDateTime;

use crate::domain::models::{
    EntryKind, MatchKind, MatchStatus, PointKind, SlotSource, TournamentFormat, WinningReason,
};

#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub format: TournamentFormat,
    pub games_to_win: i32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: i64,
    pub tournament_id: i64,
    pub name: String,
    pub region: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub team_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: i64,
    pub tournament_id: i64,
    pub entry_kind: EntryKind,
    pub team_id: Option<i64>,
    pub seed_rank: Option<i32>,
    pub group_key: Option<String>,
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
}

/// Registered player pairing under an entry; singles entries carry a pair
/// with only player1 set.
#[derive(Debug, Clone)]
pub struct TournamentPair {
    pub id: i64,
    pub entry_id: i64,
    pub player1_id: i64,
    pub player2_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Phase {
    pub id: i64,
    pub tournament_id: i64,
    pub sequence: i32,
    pub games_to_win: i32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Match {
    pub id: i64,
    pub tournament_id: i64,
    pub phase_id: i64,
    pub round: i32,
    pub slot_index: i32,
    pub match_number: i32,
    pub round_label: String,
    pub match_kind: MatchKind,
    pub status: MatchStatus,
    pub version: i64,
    pub parent_match_id: Option<i64>,
    pub next_match_id: Option<i64>,
    pub winner_source_match_a: Option<i64>,
    pub winner_source_match_b: Option<i64>,
    pub umpire_user_id: Option<i64>,
    pub court: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Insert payload for a match row; status starts `pending`, version at 0.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub tournament_id: i64,
    pub phase_id: i64,
    pub round: i32,
    pub slot_index: i32,
    pub match_number: i32,
    pub round_label: String,
    pub match_kind: MatchKind,
    pub parent_match_id: Option<i64>,
    pub umpire_user_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct MatchSlot {
    pub id: i64,
    pub match_id: i64,
    pub slot_number: i32,
    pub source_type: SlotSource,
    pub entry_id: Option<i64>,
    pub source_match_id: Option<i64>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MatchPair {
    pub id: i64,
    pub match_id: i64,
    pub pair_number: i32,
    pub team_id: Option<i64>,
    pub player1_id: Option<i64>,
    pub player2_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct MatchScore {
    pub id: i64,
    pub match_id: i64,
    pub game_count_a: i32,
    pub game_count_b: i32,
    pub final_score: Option<String>,
    pub winner_id: Option<i64>,
    pub winning_reason: Option<WinningReason>,
    pub ended_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Point {
    pub id: i64,
    pub match_id: i64,
    pub point_type: PointKind,
    pub client_key: String,
    pub undone: bool,
    pub recorded_at: Option<NaiveDateTime>,
}
