use chrono::Utc;
use log::{info, warn};

use crate::database::models::{Match, MatchPair, MatchSlot};
use crate::database::{self, DbConn};
use crate::domain::models::{MatchStatus, SlotSource, WinningReason};
use crate::errors::{ServiceError, ServiceResult};

/// Concrete participant data pushed into a downstream slot.
struct Participants {
    team_id: Option<i64>,
    player1_id: Option<i64>,
    player2_id: Option<i64>,
}

/// Match completion and winner propagation.
///
/// All operations are sequences of single-row store calls without a
/// surrounding transaction; re-running them is safe (propagation upserts),
/// which is the recovery path after a crash mid-sequence.
pub struct MatchFlowService;

impl MatchFlowService {
    pub fn new() -> Self {
        Self
    }

    /// Winner of a match, if one can be determined yet.
    ///
    /// A recorded score with unequal game counts decides directly.
    /// Otherwise the match can only be decided as a walkover: exactly one
    /// non-bye slot, resolved recursively through `winner` sources since a
    /// bye's winner may itself come from an earlier bye.
    pub fn determine_match_winner(
        &self,
        conn: &mut DbConn,
        match_id: i64,
    ) -> ServiceResult<Option<i64>> {
        let match_row = self.load_match(conn, match_id)?;

        let score = database::match_scores::find_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load match score"))?;

        if let Some(score) = score {
            if score.game_count_a != score.game_count_b {
                let pair_number = if score.game_count_a > score.game_count_b {
                    1
                } else {
                    2
                };
                let pair =
                    database::match_pairs::find_by_match_and_number(conn, match_id, pair_number)
                        .map_err(ServiceError::dependency("load match pair"))?
                        .ok_or_else(|| {
                            ServiceError::invalid_state(format!(
                                "match {match_id} has a score but no participants in pair {pair_number}"
                            ))
                        })?;
                return self.pair_occupant_id(conn, match_row.tournament_id, &pair);
            }
        }

        let slots = database::match_slots::list_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load match slots"))?;
        let non_bye: Vec<&MatchSlot> = slots
            .iter()
            .filter(|slot| slot.source_type != SlotSource::Bye)
            .collect();

        if non_bye.len() == 1 {
            return self.resolve_slot_occupant(conn, non_bye[0]);
        }

        Ok(None)
    }

    /// Records the outcome on the score row. Safe to repeat with the same
    /// arguments.
    pub fn update_match_score_with_winner(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        winner_id: i64,
        winning_reason: WinningReason,
    ) -> ServiceResult<()> {
        database::match_scores::get_or_create(conn, match_id)
            .map_err(ServiceError::dependency("create match score"))?;
        database::match_scores::set_winner(
            conn,
            match_id,
            winner_id,
            winning_reason,
            Utc::now().naive_utc(),
        )
        .map_err(ServiceError::dependency("record match winner"))
    }

    /// Top-level completion: requires a determinable winner, records it,
    /// and pushes the right winner onward. A child of a team match never
    /// advances itself; its parent does, once every sibling is done.
    pub fn process_match_finish(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<i64> {
        let match_row = self.load_match(conn, match_id)?;

        if !matches!(
            match_row.status,
            MatchStatus::InProgress | MatchStatus::Paused
        ) {
            return Err(ServiceError::invalid_state(format!(
                "match {match_id} is {} and cannot be finished",
                match_row.status.as_str()
            )));
        }

        let winner = self
            .determine_match_winner(conn, match_id)?
            .ok_or_else(|| {
                ServiceError::invalid_state(format!("match {match_id} has no determinable winner"))
            })?;

        self.update_match_score_with_winner(conn, match_id, winner, WinningReason::Normal)?;
        self.stamp_final_score(conn, match_id)?;
        database::matches::update_status(conn, match_id, MatchStatus::Finished)
            .map_err(ServiceError::dependency("finish match"))?;
        info!("Match {match_id} finished, winner {winner}");

        if let Some(parent_id) = match_row.parent_match_id {
            if let Some(team_winner) = self.finish_parent_team_match(conn, parent_id)? {
                self.propagate_winner_to_next_match(conn, parent_id, team_winner)?;
            }
        } else {
            self.propagate_winner_to_next_match(conn, match_id, winner)?;
        }

        Ok(winner)
    }

    /// Aggregates a team match once every child is finished.
    ///
    /// Game counts are the per-team child wins, assigned by the parent's
    /// own pair 1 / pair 2 teams. A team reaching the majority
    /// (`ceil(children / 2)`) wins even when the other team took some of
    /// the remaining children. Returns the winning team, `None` while
    /// children are still open or when the wins tie.
    pub fn finish_parent_team_match(
        &self,
        conn: &mut DbConn,
        parent_match_id: i64,
    ) -> ServiceResult<Option<i64>> {
        let parent = self.load_match(conn, parent_match_id)?;

        let children = database::matches::list_children(conn, parent_match_id)
            .map_err(ServiceError::dependency("load child matches"))?;
        if children.is_empty() {
            return Err(ServiceError::invalid_state(format!(
                "team match {parent_match_id} has no child matches"
            )));
        }

        if children
            .iter()
            .any(|child| child.status != MatchStatus::Finished)
        {
            return Ok(None);
        }

        let parent_pairs = database::match_pairs::list_by_match(conn, parent_match_id)
            .map_err(ServiceError::dependency("load parent pairs"))?;
        let team_a = pair_team(&parent_pairs, 1);
        let team_b = pair_team(&parent_pairs, 2);

        let mut wins_a = 0;
        let mut wins_b = 0;
        for child in &children {
            let child_winner = database::match_scores::find_by_match(conn, child.id)
                .map_err(ServiceError::dependency("load child score"))?
                .and_then(|score| score.winner_id);

            match child_winner {
                Some(winner) if Some(winner) == team_a => wins_a += 1,
                Some(winner) if Some(winner) == team_b => wins_b += 1,
                other => warn!(
                    "Child match {} winner {:?} belongs to neither team of parent {}",
                    child.id, other, parent_match_id
                ),
            }
        }

        let majority = (children.len() + 1) / 2;
        let winner = if wins_a >= majority {
            team_a
        } else if wins_b >= majority {
            team_b
        } else {
            warn!("Team match {parent_match_id} finished {wins_a}-{wins_b} without a majority");
            None
        };

        database::match_scores::get_or_create(conn, parent_match_id)
            .map_err(ServiceError::dependency("create parent score"))?;
        database::match_scores::update_games(conn, parent_match_id, wins_a as i32, wins_b as i32)
            .map_err(ServiceError::dependency("record parent game counts"))?;
        database::match_scores::set_final_score(
            conn,
            parent_match_id,
            &format!("{wins_a}-{wins_b}"),
        )
        .map_err(ServiceError::dependency("record parent final score"))?;
        if let Some(winner) = winner {
            self.update_match_score_with_winner(conn, parent_match_id, winner, WinningReason::Normal)?;
        }
        database::matches::update_status(conn, parent_match_id, MatchStatus::Finished)
            .map_err(ServiceError::dependency("finish parent match"))?;
        info!("Team match {parent_match_id} finished {wins_a}-{wins_b}");

        Ok(winner)
    }

    /// Pushes a winner into the downstream match. The destination slot
    /// comes from the winner-source pointers when they are wired, from
    /// slot-index parity otherwise. Upsert semantics make repeat calls
    /// converge on a single row.
    pub fn propagate_winner_to_next_match(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        winner_id: i64,
    ) -> ServiceResult<()> {
        let match_row = self.load_match(conn, match_id)?;

        let Some(next_match_id) = match_row.next_match_id else {
            return Ok(());
        };
        let next = database::matches::find_by_id(conn, next_match_id)
            .map_err(ServiceError::dependency("load next match"))?
            .ok_or(ServiceError::NotFound("next match"))?;

        let pair_number = if next.winner_source_match_a == Some(match_id) {
            1
        } else if next.winner_source_match_b == Some(match_id) {
            2
        } else if match_row.slot_index % 2 == 0 {
            1
        } else {
            2
        };

        let participants = self.resolve_winner_participants(conn, &match_row, winner_id)?;
        database::match_pairs::upsert_pair(
            conn,
            next_match_id,
            pair_number,
            participants.team_id,
            participants.player1_id,
            participants.player2_id,
        )
        .map_err(ServiceError::dependency("upsert downstream pair"))?;

        info!("Winner {winner_id} of match {match_id} advanced to match {next_match_id} pair {pair_number}");
        Ok(())
    }

    /// Walkover completion for a freshly generated bye match: marks it
    /// finished with a `DEFAULT` reason and advances the winner.
    pub fn resolve_bye(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Option<i64>> {
        let Some(winner) = self.determine_match_winner(conn, match_id)? else {
            warn!("Bye match {match_id} has no resolvable winner yet");
            return Ok(None);
        };

        self.update_match_score_with_winner(conn, match_id, winner, WinningReason::Default)?;
        database::matches::update_status(conn, match_id, MatchStatus::Finished)
            .map_err(ServiceError::dependency("finish bye match"))?;
        self.propagate_winner_to_next_match(conn, match_id, winner)?;

        Ok(Some(winner))
    }

    pub fn start_match(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Match> {
        self.transition(conn, match_id, &[MatchStatus::Pending], MatchStatus::InProgress)
    }

    pub fn pause_match(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Match> {
        self.transition(conn, match_id, &[MatchStatus::InProgress], MatchStatus::Paused)
    }

    pub fn resume_match(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Match> {
        self.transition(conn, match_id, &[MatchStatus::Paused], MatchStatus::InProgress)
    }

    /// Explicit revert of a finished match: the outcome is cleared, the
    /// point ledger survives, and play reopens in progress.
    pub fn revert_match_finish(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Match> {
        let match_row = self.load_match(conn, match_id)?;
        if match_row.status != MatchStatus::Finished {
            return Err(ServiceError::invalid_state(format!(
                "match {match_id} is {} and cannot be reverted",
                match_row.status.as_str()
            )));
        }

        database::match_scores::clear_winner(conn, match_id)
            .map_err(ServiceError::dependency("clear match winner"))?;
        database::matches::update_status(conn, match_id, MatchStatus::InProgress)
            .map_err(ServiceError::dependency("reopen match"))?;
        info!("Match {match_id} finish reverted");

        self.load_match(conn, match_id)
    }

    fn transition(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        from: &[MatchStatus],
        to: MatchStatus,
    ) -> ServiceResult<Match> {
        let match_row = self.load_match(conn, match_id)?;
        if !from.contains(&match_row.status) {
            return Err(ServiceError::invalid_state(format!(
                "match {match_id} is {} and cannot become {}",
                match_row.status.as_str(),
                to.as_str()
            )));
        }

        database::matches::update_status(conn, match_id, to)
            .map_err(ServiceError::dependency("update match status"))?;
        self.load_match(conn, match_id)
    }

    fn load_match(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<Match> {
        database::matches::find_by_id(conn, match_id)
            .map_err(ServiceError::dependency("load match"))?
            .ok_or(ServiceError::NotFound("match"))
    }

    fn stamp_final_score(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<()> {
        let score = database::match_scores::find_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load match score"))?;
        if let Some(score) = score {
            database::match_scores::set_final_score(
                conn,
                match_id,
                &format!("{}-{}", score.game_count_a, score.game_count_b),
            )
            .map_err(ServiceError::dependency("record final score"))?;
        }
        Ok(())
    }

    /// Winner id for the occupant of a materialized pair: the team when one
    /// is attached, otherwise the registered pair matching its players.
    fn pair_occupant_id(
        &self,
        conn: &mut DbConn,
        tournament_id: i64,
        pair: &MatchPair,
    ) -> ServiceResult<Option<i64>> {
        if let Some(team_id) = pair.team_id {
            return Ok(Some(team_id));
        }

        let Some(player1_id) = pair.player1_id else {
            return Ok(None);
        };
        let registered = database::pairs::find_in_tournament_matching(
            conn,
            tournament_id,
            player1_id,
            pair.player2_id,
        )
        .map_err(ServiceError::dependency("resolve registered pair"))?;

        Ok(registered.map(|p| p.id))
    }

    fn resolve_slot_occupant(
        &self,
        conn: &mut DbConn,
        slot: &MatchSlot,
    ) -> ServiceResult<Option<i64>> {
        match slot.source_type {
            SlotSource::Entry => {
                let entry_id = slot.entry_id.ok_or_else(|| {
                    ServiceError::invalid_state(format!(
                        "entry slot {} carries no entry id",
                        slot.id
                    ))
                })?;
                let entry = database::entries::find_by_id(conn, entry_id)
                    .map_err(ServiceError::dependency("load slot entry"))?
                    .ok_or(ServiceError::NotFound("entry"))?;
                self.entry_winner_id(conn, entry.id, entry.team_id)
            }
            SlotSource::Winner => {
                let source_match_id = slot.source_match_id.ok_or_else(|| {
                    ServiceError::invalid_state(format!(
                        "winner slot {} carries no source match",
                        slot.id
                    ))
                })?;
                self.determine_match_winner(conn, source_match_id)
            }
            SlotSource::Loser | SlotSource::Bye => Ok(None),
        }
    }

    fn entry_winner_id(
        &self,
        conn: &mut DbConn,
        entry_id: i64,
        team_id: Option<i64>,
    ) -> ServiceResult<Option<i64>> {
        if let Some(team_id) = team_id {
            return Ok(Some(team_id));
        }
        let pairs = database::pairs::list_by_entry(conn, entry_id)
            .map_err(ServiceError::dependency("load entry pairs"))?;
        Ok(pairs.first().map(|p| p.id))
    }

    /// Concrete team/player data for a winner id. A team id resolves to the
    /// registered pair whose players took the winning slot of the finished
    /// match, with any pair under the team's entries as fallback; a pair id
    /// resolves directly.
    fn resolve_winner_participants(
        &self,
        conn: &mut DbConn,
        match_row: &Match,
        winner_id: i64,
    ) -> ServiceResult<Participants> {
        let team_entry =
            database::entries::find_active_by_team(conn, match_row.tournament_id, winner_id)
                .map_err(ServiceError::dependency("resolve winner team"))?;

        if team_entry.is_some() {
            let winning_players = self.winning_slot_players(conn, match_row.id, winner_id)?;
            let registered = match winning_players {
                Some((player1_id, player2_id)) => database::pairs::find_for_team_matching(
                    conn,
                    match_row.tournament_id,
                    winner_id,
                    player1_id,
                    player2_id,
                )
                .map_err(ServiceError::dependency("match winning pair"))?,
                None => None,
            };
            let pair = match registered {
                Some(pair) => Some(pair),
                None => {
                    database::pairs::list_for_team(conn, match_row.tournament_id, winner_id)
                        .map_err(ServiceError::dependency("load team pairs"))?
                        .into_iter()
                        .next()
                }
            };

            let (player1_id, player2_id) = match pair {
                Some(pair) => (Some(pair.player1_id), pair.player2_id),
                None => (None, None),
            };
            return Ok(Participants {
                team_id: Some(winner_id),
                player1_id,
                player2_id,
            });
        }

        let pair = database::pairs::find_by_id(conn, winner_id)
            .map_err(ServiceError::dependency("resolve winner pair"))?
            .ok_or(ServiceError::NotFound("winner"))?;
        let entry = database::entries::find_by_id(conn, pair.entry_id)
            .map_err(ServiceError::dependency("load winner entry"))?;

        Ok(Participants {
            team_id: entry.and_then(|e| e.team_id),
            player1_id: Some(pair.player1_id),
            player2_id: pair.player2_id,
        })
    }

    /// Players who occupied the winning side of the just-finished match.
    fn winning_slot_players(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        winner_team_id: i64,
    ) -> ServiceResult<Option<(i64, Option<i64>)>> {
        let pairs = database::match_pairs::list_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load match pairs"))?;

        Ok(pairs
            .iter()
            .find(|pair| pair.team_id == Some(winner_team_id))
            .and_then(|pair| pair.player1_id.map(|p1| (p1, pair.player2_id))))
    }
}

impl Default for MatchFlowService {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_team(pairs: &[MatchPair], pair_number: i32) -> Option<i64> {
    pairs
        .iter()
        .find(|pair| pair.pair_number == pair_number)
        .and_then(|pair| pair.team_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::config::settings::ScoringSettings;
    use crate::domain::models::PointKind;
    use crate::services::fixtures;
    use crate::services::scoring::ScoringService;

    fn flow() -> MatchFlowService {
        MatchFlowService::new()
    }

    fn round_matches(conn: &mut DbConn, phase_id: i64, round: i32) -> Vec<Match> {
        database::matches::list_bracket_by_phase(conn, phase_id)
            .expect("bracket")
            .into_iter()
            .filter(|m| m.round == round)
            .collect()
    }

    fn score_points(conn: &mut DbConn, match_id: i64, a_points: usize, b_points: usize) {
        let scoring = ScoringService::new(ScoringSettings::default());
        for _ in 0..a_points {
            scoring
                .add_point(conn, match_id, PointKind::AScore, &Uuid::new_v4().to_string(), None)
                .expect("a point");
        }
        for _ in 0..b_points {
            scoring
                .add_point(conn, match_id, PointKind::BScore, &Uuid::new_v4().to_string(), None)
                .expect("b point");
        }
    }

    #[test]
    fn finishing_records_and_propagates_the_winner() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        let final_match = round_matches(&mut conn, summary.phase_id, 2)[0].clone();

        flow().start_match(&mut conn, first.id).unwrap();
        score_points(&mut conn, first.id, 2, 1);
        let winner = flow().process_match_finish(&mut conn, first.id).unwrap();

        let refreshed = database::matches::find_by_id(&mut conn, first.id)
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.status, MatchStatus::Finished);

        let score = database::match_scores::find_by_match(&mut conn, first.id)
            .unwrap()
            .unwrap();
        assert_eq!(score.winner_id, Some(winner));
        assert_eq!(score.winning_reason, Some(WinningReason::Normal));
        assert_eq!(score.final_score.as_deref(), Some("2-1"));

        // Slot 1 side won, so the winner lands in the final's pair 1.
        let original = database::match_pairs::find_by_match_and_number(&mut conn, first.id, 1)
            .unwrap()
            .unwrap();
        let advanced =
            database::match_pairs::find_by_match_and_number(&mut conn, final_match.id, 1)
                .unwrap()
                .expect("winner advanced into the final");
        assert_eq!(advanced.player1_id, original.player1_id);
    }

    #[test]
    fn propagation_upserts_a_single_destination_row() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        let final_match = round_matches(&mut conn, summary.phase_id, 2)[0].clone();

        flow().start_match(&mut conn, first.id).unwrap();
        score_points(&mut conn, first.id, 1, 0);
        let winner = flow().process_match_finish(&mut conn, first.id).unwrap();

        flow()
            .propagate_winner_to_next_match(&mut conn, first.id, winner)
            .unwrap();
        flow()
            .propagate_winner_to_next_match(&mut conn, first.id, winner)
            .unwrap();

        let destination_rows = database::match_pairs::list_by_match(&mut conn, final_match.id)
            .unwrap()
            .into_iter()
            .filter(|pair| pair.pair_number == 1)
            .count();
        assert_eq!(destination_rows, 1);
    }

    #[test]
    fn finish_without_determinable_winner_is_rejected() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        flow().start_match(&mut conn, first.id).unwrap();

        let err = flow().process_match_finish(&mut conn, first.id).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn finish_requires_a_started_match() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        let err = flow().process_match_finish(&mut conn, first.id).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn team_majority_decides_the_parent_once_all_children_finish() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let tournament = fixtures::team_tournament(&mut conn);
        let (north, _) = fixtures::add_team_entry(&mut conn, tournament.id, "North High", None);
        let (south, _) = fixtures::add_team_entry(&mut conn, tournament.id, "South High", None);

        let summary = crate::services::draw::DrawService::new(Default::default())
            .generate(&mut conn, tournament.id, crate::domain::models::UmpirePolicy::None)
            .expect("draw");

        let node = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        let children = database::matches::list_children(&mut conn, node.id).unwrap();
        assert_eq!(children.len(), 3);

        // Line-ups for every rubber: north on side A, south on side B.
        for child in &children {
            database::match_pairs::upsert_pair(&mut conn, child.id, 1, Some(north.id), None, None)
                .unwrap();
            database::match_pairs::upsert_pair(&mut conn, child.id, 2, Some(south.id), None, None)
                .unwrap();
        }

        // North takes the first two rubbers, south the third.
        for (child, (a, b)) in children.iter().zip([(2, 0), (2, 1), (0, 2)]) {
            flow().start_match(&mut conn, child.id).unwrap();
            score_points(&mut conn, child.id, a, b);
            flow().process_match_finish(&mut conn, child.id).unwrap();

            let parent = database::matches::find_by_id(&mut conn, node.id).unwrap().unwrap();
            if child.id != children[2].id {
                assert_eq!(parent.status, MatchStatus::Pending, "parent finished early");
            }
        }

        let parent = database::matches::find_by_id(&mut conn, node.id).unwrap().unwrap();
        assert_eq!(parent.status, MatchStatus::Finished);

        let score = database::match_scores::find_by_match(&mut conn, node.id)
            .unwrap()
            .unwrap();
        assert_eq!((score.game_count_a, score.game_count_b), (2, 1));
        assert_eq!(score.winner_id, Some(north.id));
        assert_eq!(score.final_score.as_deref(), Some("2-1"));
    }

    #[test]
    fn revert_reopens_a_finished_match() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();
        flow().start_match(&mut conn, first.id).unwrap();
        score_points(&mut conn, first.id, 1, 0);
        flow().process_match_finish(&mut conn, first.id).unwrap();

        let reverted = flow().revert_match_finish(&mut conn, first.id).unwrap();
        assert_eq!(reverted.status, MatchStatus::InProgress);

        let score = database::match_scores::find_by_match(&mut conn, first.id)
            .unwrap()
            .unwrap();
        assert_eq!(score.winner_id, None);
        assert_eq!(score.winning_reason, None);
        // The point ledger survives the revert.
        assert_eq!(score.game_count_a, 1);
    }

    #[test]
    fn lifecycle_transitions_are_gated() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);

        let first = round_matches(&mut conn, summary.phase_id, 1)[0].clone();

        let err = flow().pause_match(&mut conn, first.id).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        flow().start_match(&mut conn, first.id).unwrap();
        flow().pause_match(&mut conn, first.id).unwrap();
        let resumed = flow().resume_match(&mut conn, first.id).unwrap();
        assert_eq!(resumed.status, MatchStatus::InProgress);
    }
}
