use log::{error, info};

use crate::config::settings::DrawSettings;
use crate::database::models::{Entry, Match, NewMatch, Phase, Tournament};
use crate::database::{self, DbConn};
use crate::domain::models::{DrawSummary, EntryKind, MatchKind, SlotSource, UmpirePolicy};
use crate::errors::{ServiceError, ServiceResult};
use crate::seeding::{full_pair_indices, placement_order};
use crate::services::match_flow::MatchFlowService;

/// Builds the single-elimination bracket for a tournament: places entries
/// into seeded slots, creates every round's matches, wires the
/// winner-advancement pointers and resolves round-1 byes.
pub struct DrawService {
    settings: DrawSettings,
}

impl DrawService {
    pub fn new(settings: DrawSettings) -> Self {
        Self { settings }
    }

    pub fn generate(
        &self,
        conn: &mut DbConn,
        tournament_id: i64,
        umpire_policy: UmpirePolicy,
    ) -> ServiceResult<DrawSummary> {
        let tournament = database::tournaments::find_by_id(conn, tournament_id)
            .map_err(ServiceError::dependency("load tournament"))?
            .ok_or(ServiceError::NotFound("tournament"))?;

        let entries = self.load_entries(conn, &tournament)?;
        if entries.len() < 2 {
            return Err(ServiceError::validation(format!(
                "tournament {tournament_id} has {} active entries, at least 2 required",
                entries.len()
            )));
        }

        self.check_regeneration_allowed(conn, tournament_id)?;

        // Step 1: drop whatever bracket exists
        let phases = database::phases::list_by_tournament(conn, tournament_id)
            .map_err(ServiceError::dependency("list phases"))?;
        for phase in &phases {
            database::phases::delete_cascade(conn, phase.id)
                .map_err(ServiceError::dependency("delete previous phase"))?;
        }
        if !phases.is_empty() {
            info!("Dropped {} previous phase(s) for tournament {tournament_id}", phases.len());
        }

        // Step 2: fresh phase
        let phase = database::phases::insert_phase(conn, tournament_id, 1, tournament.games_to_win)
            .map_err(ServiceError::dependency("create phase"))?;

        // Step 3: bracket dimensions
        let entry_count = entries.len();
        let bracket_size = entry_count.next_power_of_two();
        let bye_count = bracket_size - entry_count;
        let round_count = bracket_size.trailing_zeros();
        let recommended_seeds = self.settings.recommended_seeds(bracket_size);
        info!(
            "Tournament {tournament_id}: {entry_count} entries into {bracket_size} slots, {bye_count} byes, {round_count} rounds (recommended seeds: {recommended_seeds})"
        );

        // Step 4: seeded slot assignment
        let slot_entries = self.assign_slots(&entries, bracket_size, bye_count);

        // Steps 5-7: matches for every round, then pointer wiring
        let bracket =
            self.create_matches(conn, &tournament, &phase, bracket_size, round_count, umpire_policy)?;
        self.wire_bracket(conn, &bracket);

        // Step 8: slots and materialized round-1 pairs
        self.insert_round_one_slots(conn, &bracket[0], &slot_entries)?;
        self.insert_downstream_slots(conn, &bracket)?;

        // Step 9: byes finish immediately and their winners advance
        let flow = MatchFlowService::new();
        for (pair_index, match_row) in bracket[0].iter().enumerate() {
            let has_bye = slot_entries[2 * pair_index].is_none()
                || slot_entries[2 * pair_index + 1].is_none();
            if has_bye {
                flow.resolve_bye(conn, match_row.id)?;
            }
        }

        info!("Draw generated for tournament {tournament_id}: phase {}", phase.id);
        Ok(DrawSummary {
            phase_id: phase.id,
            entry_count,
            bracket_size,
            bye_count,
            round_count,
            match_count: bracket_size - 1,
            recommended_seeds,
        })
    }

    /// Team formats draw team entries only; everything else takes the full
    /// active list.
    fn load_entries(
        &self,
        conn: &mut DbConn,
        tournament: &Tournament,
    ) -> ServiceResult<Vec<Entry>> {
        let entries = if tournament.format.is_team() {
            database::entries::list_active_by_kind(conn, tournament.id, EntryKind::Team)
        } else {
            database::entries::list_active(conn, tournament.id)
        };
        entries.map_err(ServiceError::dependency("load entries"))
    }

    /// A draw may be rebuilt only while nothing real has happened: no match
    /// underway, no finished match decided by actual play.
    fn check_regeneration_allowed(
        &self,
        conn: &mut DbConn,
        tournament_id: i64,
    ) -> ServiceResult<()> {
        let started = database::matches::count_started(conn, tournament_id)
            .map_err(ServiceError::dependency("count started matches"))?;
        if started > 0 {
            return Err(ServiceError::invalid_state(format!(
                "tournament {tournament_id} has {started} match(es) in progress"
            )));
        }

        let real_results = database::matches::count_finished_with_real_result(conn, tournament_id)
            .map_err(ServiceError::dependency("count real results"))?;
        if real_results > 0 {
            return Err(ServiceError::invalid_state(format!(
                "tournament {tournament_id} has {real_results} finished match(es) with real results"
            )));
        }

        Ok(())
    }

    /// Maps entries onto bracket slots: strongest first along the placement
    /// order, byes pinned to the low-priority slot of each non-full pair so
    /// no pair is ever bye-vs-bye, then a best-effort pass separating
    /// same-group entrants in round 1.
    fn assign_slots(&self, entries: &[Entry], bracket_size: usize, bye_count: usize) -> Vec<Option<Entry>> {
        let mut ordered: Vec<&Entry> = entries.iter().collect();
        ordered.sort_by_key(|e| (e.seed_rank.is_none(), e.seed_rank.unwrap_or(i32::MAX), e.id));

        let placement = placement_order(bracket_size);
        let mut priority_of = vec![0usize; bracket_size];
        for (priority, &slot) in placement.iter().enumerate() {
            priority_of[slot] = priority;
        }

        let pair_count = bracket_size / 2;
        let full_pairs = full_pair_indices(pair_count, pair_count - bye_count);

        let mut is_bye = vec![false; bracket_size];
        for pair in 0..pair_count {
            if full_pairs.contains(&pair) {
                continue;
            }
            // The real entrant keeps the stronger slot of the pair.
            let (left, right) = (2 * pair, 2 * pair + 1);
            if priority_of[left] <= priority_of[right] {
                is_bye[right] = true;
            } else {
                is_bye[left] = true;
            }
        }

        let mut slots: Vec<Option<Entry>> = vec![None; bracket_size];
        let mut remaining = ordered.into_iter();
        for &slot in &placement {
            if is_bye[slot] {
                continue;
            }
            if let Some(entry) = remaining.next() {
                slots[slot] = Some(entry.clone());
            }
        }

        self.separate_groups(&mut slots, pair_count);
        slots
    }

    /// Bounded swap pass keeping same-group entrants out of round-1
    /// meetings where it can. Seeded entrants stay anchored; only unseeded
    /// occupants move, and only into pairs where no new clash appears.
    fn separate_groups(&self, slots: &mut [Option<Entry>], pair_count: usize) {
        for _ in 0..self.settings.group_swap_max_passes {
            let mut swapped = false;

            for pair in 0..pair_count {
                let (left, right) = (2 * pair, 2 * pair + 1);
                if !same_group(&slots[left], &slots[right]) {
                    continue;
                }

                let movable = if is_unseeded(&slots[right]) {
                    right
                } else if is_unseeded(&slots[left]) {
                    left
                } else {
                    continue;
                };
                let anchored = if movable == right { left } else { right };

                'candidates: for other in 0..pair_count {
                    if other == pair {
                        continue;
                    }
                    for candidate in [2 * other, 2 * other + 1] {
                        let partner = if candidate % 2 == 0 { candidate + 1 } else { candidate - 1 };
                        if !is_unseeded(&slots[candidate]) {
                            continue;
                        }
                        let clash_here = group_of(&slots[candidate]).is_some()
                            && group_of(&slots[candidate]) == group_of(&slots[anchored]);
                        let clash_there = group_of(&slots[movable]).is_some()
                            && group_of(&slots[movable]) == group_of(&slots[partner]);
                        if !clash_here && !clash_there {
                            slots.swap(movable, candidate);
                            swapped = true;
                            break 'candidates;
                        }
                    }
                }
            }

            if !swapped {
                break;
            }
        }
    }

    /// Creates every round's matches bottom-up. Team formats add the child
    /// individual matches right under each bracket node.
    fn create_matches(
        &self,
        conn: &mut DbConn,
        tournament: &Tournament,
        phase: &Phase,
        bracket_size: usize,
        round_count: u32,
        umpire_policy: UmpirePolicy,
    ) -> ServiceResult<Vec<Vec<Match>>> {
        let umpires = match umpire_policy {
            UmpirePolicy::Rotate => database::users::list_umpire_ids(conn, tournament.id)
                .map_err(ServiceError::dependency("list umpires"))?,
            UmpirePolicy::None => Vec::new(),
        };
        let mut umpire_rotation = umpires.iter().cycle();

        let node_kind = if tournament.format.is_team() {
            MatchKind::TeamMatch
        } else {
            MatchKind::IndividualMatch
        };

        let mut match_number = 1;
        let mut bracket = Vec::with_capacity(round_count as usize);

        for round in 1..=round_count {
            let matches_in_round = bracket_size >> round;
            let label = round_label(round, round_count);
            let mut row = Vec::with_capacity(matches_in_round);

            for slot_index in 0..matches_in_round {
                let umpire_user_id = if round == 1 {
                    umpire_rotation.next().copied()
                } else {
                    None
                };

                let node = database::matches::insert_match(
                    conn,
                    &NewMatch {
                        tournament_id: tournament.id,
                        phase_id: phase.id,
                        round: round as i32,
                        slot_index: slot_index as i32,
                        match_number,
                        round_label: label.clone(),
                        match_kind: node_kind,
                        parent_match_id: None,
                        umpire_user_id,
                    },
                )
                .map_err(ServiceError::dependency("create match"))?;
                match_number += 1;

                if let Some(children) = tournament.format.children_per_match() {
                    for _ in 0..children {
                        database::matches::insert_match(
                            conn,
                            &NewMatch {
                                tournament_id: tournament.id,
                                phase_id: phase.id,
                                round: round as i32,
                                slot_index: slot_index as i32,
                                match_number,
                                round_label: label.clone(),
                                match_kind: MatchKind::IndividualMatch,
                                parent_match_id: Some(node.id),
                                umpire_user_id: None,
                            },
                        )
                        .map_err(ServiceError::dependency("create child match"))?;
                        match_number += 1;
                    }
                }

                row.push(node);
            }
            bracket.push(row);
        }

        Ok(bracket)
    }

    /// Second pass over the created arena: round r slot s advances to round
    /// r+1 slot s/2, slot parity picking the A or B source pointer on the
    /// downstream match. Wiring failures are logged per pair and skipped.
    fn wire_bracket(&self, conn: &mut DbConn, bracket: &[Vec<Match>]) {
        for round_index in 0..bracket.len().saturating_sub(1) {
            for (slot, match_row) in bracket[round_index].iter().enumerate() {
                let next = &bracket[round_index + 1][slot / 2];
                let pair_slot = if slot % 2 == 0 { 1 } else { 2 };

                if let Err(e) = database::matches::set_next_match_id(conn, match_row.id, next.id) {
                    error!("Failed to wire next match for match {}: {e:?}", match_row.id);
                    continue;
                }
                if let Err(e) =
                    database::matches::set_winner_source(conn, next.id, pair_slot, match_row.id)
                {
                    error!("Failed to wire winner source for match {}: {e:?}", next.id);
                }
            }
        }
    }

    fn insert_round_one_slots(
        &self,
        conn: &mut DbConn,
        round_one: &[Match],
        slot_entries: &[Option<Entry>],
    ) -> ServiceResult<()> {
        for (pair_index, match_row) in round_one.iter().enumerate() {
            for (slot_number, entry) in [
                (1, &slot_entries[2 * pair_index]),
                (2, &slot_entries[2 * pair_index + 1]),
            ] {
                match entry {
                    Some(entry) => {
                        database::match_slots::insert_slot(
                            conn,
                            match_row.id,
                            slot_number,
                            SlotSource::Entry,
                            Some(entry.id),
                            None,
                            None,
                        )
                        .map_err(ServiceError::dependency("insert entry slot"))?;
                        self.materialize_pair(conn, match_row.id, slot_number, entry)?;
                    }
                    None => {
                        database::match_slots::insert_slot(
                            conn,
                            match_row.id,
                            slot_number,
                            SlotSource::Bye,
                            None,
                            None,
                            None,
                        )
                        .map_err(ServiceError::dependency("insert bye slot"))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Known round-1 entrants become concrete match pairs right away. Team
    /// entries attach the team only; the line-up arrives when the team
    /// submits it.
    fn materialize_pair(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        pair_number: i32,
        entry: &Entry,
    ) -> ServiceResult<()> {
        let (player1_id, player2_id) = if entry.team_id.is_some() {
            (None, None)
        } else {
            let pairs = database::pairs::list_by_entry(conn, entry.id)
                .map_err(ServiceError::dependency("load entry pairs"))?;
            match pairs.first() {
                Some(pair) => (Some(pair.player1_id), pair.player2_id),
                None => {
                    log::warn!("Entry {} has no registered pair", entry.id);
                    (None, None)
                }
            }
        };

        database::match_pairs::upsert_pair(
            conn,
            match_id,
            pair_number,
            entry.team_id,
            player1_id,
            player2_id,
        )
        .map_err(ServiceError::dependency("materialize pair"))?;
        Ok(())
    }

    fn insert_downstream_slots(
        &self,
        conn: &mut DbConn,
        bracket: &[Vec<Match>],
    ) -> ServiceResult<()> {
        for round_index in 1..bracket.len() {
            for (slot, match_row) in bracket[round_index].iter().enumerate() {
                for (slot_number, feeder) in [
                    (1, &bracket[round_index - 1][2 * slot]),
                    (2, &bracket[round_index - 1][2 * slot + 1]),
                ] {
                    database::match_slots::insert_slot(
                        conn,
                        match_row.id,
                        slot_number,
                        SlotSource::Winner,
                        None,
                        Some(feeder.id),
                        None,
                    )
                    .map_err(ServiceError::dependency("insert winner slot"))?;
                }
            }
        }
        Ok(())
    }
}

/// Round names follow the ordinal convention, except the last two rounds
/// are always 準決勝 and 決勝 regardless of bracket depth.
fn round_label(round: u32, round_count: u32) -> String {
    if round == round_count {
        "決勝".to_string()
    } else if round + 1 == round_count {
        "準決勝".to_string()
    } else {
        format!("{round}回戦")
    }
}

fn same_group(a: &Option<Entry>, b: &Option<Entry>) -> bool {
    match (group_of(a), group_of(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn group_of(slot: &Option<Entry>) -> Option<&str> {
    slot.as_ref().and_then(|entry| entry.group_key.as_deref())
}

fn is_unseeded(slot: &Option<Entry>) -> bool {
    slot.as_ref().is_some_and(|entry| entry.seed_rank.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Match;
    use crate::domain::models::{MatchStatus, WinningReason};
    use crate::services::fixtures;
    use crate::services::match_flow::MatchFlowService;

    fn service() -> DrawService {
        DrawService::new(DrawSettings::default())
    }

    fn generate_singles(conn: &mut DbConn, count: usize) -> (i64, DrawSummary) {
        let tournament = fixtures::singles_tournament(conn);
        for i in 1..=count {
            fixtures::add_singles_entry(conn, tournament.id, &format!("Player {i}"), None, None);
        }
        let summary = service()
            .generate(conn, tournament.id, UmpirePolicy::None)
            .expect("draw");
        (tournament.id, summary)
    }

    fn bracket_of(conn: &mut DbConn, phase_id: i64) -> Vec<Match> {
        database::matches::list_bracket_by_phase(conn, phase_id).expect("bracket")
    }

    #[test]
    fn five_entries_fill_an_eight_slot_bracket() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = generate_singles(&mut conn, 5);

        assert_eq!(summary.bracket_size, 8);
        assert_eq!(summary.bye_count, 3);
        assert_eq!(summary.round_count, 3);
        assert_eq!(summary.match_count, 7);

        let bracket = bracket_of(&mut conn, summary.phase_id);
        assert_eq!(bracket.len(), 7);

        let labels: Vec<(i32, &str)> = bracket
            .iter()
            .map(|m| (m.round, m.round_label.as_str()))
            .collect();
        assert_eq!(labels.iter().filter(|(r, l)| *r == 1 && *l == "1回戦").count(), 4);
        assert_eq!(labels.iter().filter(|(r, l)| *r == 2 && *l == "準決勝").count(), 2);
        assert_eq!(labels.iter().filter(|(r, l)| *r == 3 && *l == "決勝").count(), 1);
    }

    #[test]
    fn no_round_one_match_is_bye_versus_bye() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();

        for count in [3usize, 5, 6, 9, 11] {
            let tournament = fixtures::singles_tournament(&mut conn);
            for i in 1..=count {
                fixtures::add_singles_entry(&mut conn, tournament.id, &format!("P{i}"), None, None);
            }
            let summary = service()
                .generate(&mut conn, tournament.id, UmpirePolicy::None)
                .expect("draw");

            for match_row in bracket_of(&mut conn, summary.phase_id) {
                if match_row.round != 1 {
                    continue;
                }
                let slots = database::match_slots::list_by_match(&mut conn, match_row.id).unwrap();
                let byes = slots
                    .iter()
                    .filter(|s| s.source_type == SlotSource::Bye)
                    .count();
                assert!(byes <= 1, "match {} has {byes} byes ({count} entries)", match_row.id);
            }
        }
    }

    #[test]
    fn byes_finish_immediately_and_their_winners_advance() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = generate_singles(&mut conn, 5);

        let bracket = bracket_of(&mut conn, summary.phase_id);
        let mut bye_matches = 0;

        for match_row in bracket.iter().filter(|m| m.round == 1) {
            let slots = database::match_slots::list_by_match(&mut conn, match_row.id).unwrap();
            if !slots.iter().any(|s| s.source_type == SlotSource::Bye) {
                continue;
            }
            bye_matches += 1;

            assert_eq!(match_row.status, MatchStatus::Finished);

            let score = database::match_scores::find_by_match(&mut conn, match_row.id)
                .unwrap()
                .expect("bye match has a score row");
            assert_eq!(score.winning_reason, Some(WinningReason::Default));
            let winner = score.winner_id.expect("bye match has a winner");

            let next_id = match_row.next_match_id.expect("round 1 match has a next match");
            let next = database::matches::find_by_id(&mut conn, next_id).unwrap().unwrap();
            let pair_number = if next.winner_source_match_a == Some(match_row.id) {
                1
            } else {
                assert_eq!(next.winner_source_match_b, Some(match_row.id));
                2
            };
            let advanced =
                database::match_pairs::find_by_match_and_number(&mut conn, next_id, pair_number)
                    .unwrap();
            assert!(advanced.is_some(), "winner {winner} missing from match {next_id}");
        }

        assert_eq!(bye_matches, 3);
    }

    #[test]
    fn wiring_follows_bracket_topology() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = generate_singles(&mut conn, 4);

        let bracket = bracket_of(&mut conn, summary.phase_id);
        let round_one: Vec<&Match> = bracket.iter().filter(|m| m.round == 1).collect();
        let final_match = bracket.iter().find(|m| m.round == 2).unwrap();

        assert!(round_one
            .iter()
            .all(|m| m.next_match_id == Some(final_match.id)));
        assert_eq!(final_match.winner_source_match_a, Some(round_one[0].id));
        assert_eq!(final_match.winner_source_match_b, Some(round_one[1].id));
    }

    #[test]
    fn fewer_than_two_entries_is_rejected() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let tournament = fixtures::singles_tournament(&mut conn);
        fixtures::add_singles_entry(&mut conn, tournament.id, "Lonely", None, None);

        let err = service()
            .generate(&mut conn, tournament.id, UmpirePolicy::None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn regeneration_is_blocked_while_a_match_is_underway() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (tournament_id, summary) = generate_singles(&mut conn, 4);

        let bracket = bracket_of(&mut conn, summary.phase_id);
        let first = bracket.iter().find(|m| m.round == 1).unwrap();
        MatchFlowService::new()
            .start_match(&mut conn, first.id)
            .unwrap();

        let err = service()
            .generate(&mut conn, tournament_id, UmpirePolicy::None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn walkover_results_do_not_block_regeneration() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        // Five entries leave three bye matches finished with DEFAULT.
        let (tournament_id, _) = generate_singles(&mut conn, 5);

        let second = service()
            .generate(&mut conn, tournament_id, UmpirePolicy::None)
            .expect("regeneration over walkovers");
        assert_eq!(second.bracket_size, 8);
    }

    #[test]
    fn same_group_entrants_are_separated_in_round_one() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let tournament = fixtures::singles_tournament(&mut conn);
        for (name, group) in [("A1", "east"), ("B1", "west"), ("A2", "east"), ("B2", "west")] {
            fixtures::add_singles_entry(&mut conn, tournament.id, name, None, Some(group));
        }

        let summary = service()
            .generate(&mut conn, tournament.id, UmpirePolicy::None)
            .expect("draw");

        for match_row in bracket_of(&mut conn, summary.phase_id) {
            if match_row.round != 1 {
                continue;
            }
            let slots = database::match_slots::list_by_match(&mut conn, match_row.id).unwrap();
            let groups: Vec<String> = slots
                .iter()
                .filter_map(|s| s.entry_id)
                .map(|entry_id| {
                    database::entries::find_by_id(&mut conn, entry_id)
                        .unwrap()
                        .unwrap()
                        .group_key
                        .unwrap()
                })
                .collect();
            if let [a, b] = groups.as_slice() {
                assert_ne!(a, b, "match {} pits {a} against {b}", match_row.id);
            }
        }
    }

    #[test]
    fn team_draws_create_child_matches_per_node() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let tournament = fixtures::team_tournament(&mut conn);
        fixtures::add_team_entry(&mut conn, tournament.id, "North High", Some("north"));
        fixtures::add_team_entry(&mut conn, tournament.id, "South High", Some("south"));

        let summary = service()
            .generate(&mut conn, tournament.id, UmpirePolicy::None)
            .expect("draw");
        assert_eq!(summary.bracket_size, 2);
        assert_eq!(summary.match_count, 1);

        let bracket = bracket_of(&mut conn, summary.phase_id);
        assert_eq!(bracket.len(), 1);
        assert_eq!(bracket[0].match_kind, MatchKind::TeamMatch);

        let children = database::matches::list_children(&mut conn, bracket[0].id).unwrap();
        assert_eq!(children.len(), 3);
        assert!(children
            .iter()
            .all(|c| c.match_kind == MatchKind::IndividualMatch));
    }

    #[test]
    fn round_labels_fix_the_last_two_rounds() {
        assert_eq!(round_label(1, 1), "決勝");
        assert_eq!(round_label(1, 2), "準決勝");
        assert_eq!(round_label(2, 2), "決勝");
        assert_eq!(round_label(1, 4), "1回戦");
        assert_eq!(round_label(2, 4), "2回戦");
        assert_eq!(round_label(3, 4), "準決勝");
        assert_eq!(round_label(4, 4), "決勝");
    }
}
