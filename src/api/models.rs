use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Match, MatchPair, MatchScore, MatchSlot};
use crate::domain::models::{
    DrawSummary, EntryKind, MatchKind, MatchStatus, PointKind, SlotSource, UmpirePolicy,
    WinningReason,
};
use crate::services::scoring::PointOutcome;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDrawRequest {
    pub umpire_policy: Option<UmpirePolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSummaryResponse {
    pub phase_id: i64,
    pub entry_count: usize,
    pub bracket_size: usize,
    pub bye_count: usize,
    pub round_count: u32,
    pub match_count: usize,
    pub recommended_seeds: usize,
}

impl From<DrawSummary> for DrawSummaryResponse {
    fn from(summary: DrawSummary) -> Self {
        Self {
            phase_id: summary.phase_id,
            entry_count: summary.entry_count,
            bracket_size: summary.bracket_size,
            bye_count: summary.bye_count,
            round_count: summary.round_count,
            match_count: summary.match_count,
            recommended_seeds: summary.recommended_seeds,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot_number: i32,
    pub source_type: SlotSource,
    pub entry_id: Option<i64>,
    pub source_match_id: Option<i64>,
}

impl From<MatchSlot> for SlotView {
    fn from(slot: MatchSlot) -> Self {
        Self {
            slot_number: slot.slot_number,
            source_type: slot.source_type,
            entry_id: slot.entry_id,
            source_match_id: slot.source_match_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairView {
    pub pair_number: i32,
    pub team_id: Option<i64>,
    pub player1_id: Option<i64>,
    pub player2_id: Option<i64>,
}

impl From<MatchPair> for PairView {
    fn from(pair: MatchPair) -> Self {
        Self {
            pair_number: pair.pair_number,
            team_id: pair.team_id,
            player1_id: pair.player1_id,
            player2_id: pair.player2_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub game_count_a: i32,
    pub game_count_b: i32,
    pub final_score: Option<String>,
    pub winner_id: Option<i64>,
    pub winning_reason: Option<WinningReason>,
    pub ended_at: Option<String>,
}

impl From<MatchScore> for ScoreView {
    fn from(score: MatchScore) -> Self {
        Self {
            game_count_a: score.game_count_a,
            game_count_b: score.game_count_b,
            final_score: score.final_score,
            winner_id: score.winner_id,
            winning_reason: score.winning_reason,
            ended_at: score.ended_at.map(|t| t.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: i64,
    pub round: i32,
    pub slot_index: i32,
    pub match_number: i32,
    pub round_label: String,
    pub match_kind: MatchKind,
    pub status: MatchStatus,
    pub version: i64,
    pub parent_match_id: Option<i64>,
    pub next_match_id: Option<i64>,
    pub umpire_user_id: Option<i64>,
    pub court: Option<String>,
    pub slots: Vec<SlotView>,
    pub pairs: Vec<PairView>,
    pub score: Option<ScoreView>,
}

impl MatchView {
    pub fn new(
        match_row: Match,
        slots: Vec<MatchSlot>,
        pairs: Vec<MatchPair>,
        score: Option<MatchScore>,
    ) -> Self {
        Self {
            id: match_row.id,
            round: match_row.round,
            slot_index: match_row.slot_index,
            match_number: match_row.match_number,
            round_label: match_row.round_label,
            match_kind: match_row.match_kind,
            status: match_row.status,
            version: match_row.version,
            parent_match_id: match_row.parent_match_id,
            next_match_id: match_row.next_match_id,
            umpire_user_id: match_row.umpire_user_id,
            court: match_row.court,
            slots: slots.into_iter().map(SlotView::from).collect(),
            pairs: pairs.into_iter().map(PairView::from).collect(),
            score: score.map(ScoreView::from),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawView {
    pub phase_id: i64,
    pub sequence: i32,
    pub games_to_win: i32,
    pub matches: Vec<MatchView>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub entry_kind: EntryKind,
    pub team_id: Option<i64>,
    pub seed_rank: Option<i32>,
    pub group_key: Option<String>,
    /// One or two player ids registered as the entry's pair.
    pub player_ids: Option<Vec<i64>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: i64,
    pub entry_kind: EntryKind,
    pub team_id: Option<i64>,
    pub seed_rank: Option<i32>,
    pub group_key: Option<String>,
    pub active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPointRequest {
    pub point_type: PointKind,
    pub client_key: Uuid,
    pub expected_version: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoPointRequest {
    pub expected_version: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    pub point_id: i64,
    pub point_type: PointKind,
    pub version: i64,
    pub game_count_a: i32,
    pub game_count_b: i32,
}

impl From<PointOutcome> for PointResponse {
    fn from(outcome: PointOutcome) -> Self {
        Self {
            point_id: outcome.point.id,
            point_type: outcome.point.point_type,
            version: outcome.version,
            game_count_a: outcome.game_count_a,
            game_count_b: outcome.game_count_b,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchActionResponse {
    pub id: i64,
    pub status: MatchStatus,
    pub version: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishResponse {
    pub id: i64,
    pub winner_id: i64,
}
