use log::{debug, info};

use crate::config::settings::ScoringSettings;
use crate::database::models::Point;
use crate::database::{self, DbConn};
use crate::domain::models::{MatchStatus, PointKind};
use crate::errors::{ServiceError, ServiceResult};

/// Outcome of a ledger mutation: the point involved, the match version
/// after the write, and the aggregate the caller must use as-is.
#[derive(Debug, Clone)]
pub struct PointOutcome {
    pub point: Point,
    pub version: i64,
    pub game_count_a: i32,
    pub game_count_b: i32,
}

/// Append-only point ledger with a derived aggregate per match, guarded by
/// an optimistic version compare-and-swap.
pub struct ScoringService {
    settings: ScoringSettings,
}

impl ScoringService {
    pub fn new(settings: ScoringSettings) -> Self {
        Self { settings }
    }

    /// Appends a point and advances the match version.
    ///
    /// The caller-supplied expected version is checked eagerly, before any
    /// write. The CAS at the end can still lose to a concurrent writer; in
    /// that case the point row is deliberately kept (audit trail) and only
    /// the version advance is reported as a conflict, so the caller must
    /// refetch rather than assume the point was dropped.
    pub fn add_point(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        point_type: PointKind,
        client_key: &str,
        expected_version: Option<i64>,
    ) -> ServiceResult<PointOutcome> {
        let match_row = database::matches::find_by_id(conn, match_id)
            .map_err(ServiceError::dependency("load match"))?
            .ok_or(ServiceError::NotFound("match"))?;

        if match_row.status != MatchStatus::InProgress {
            return Err(ServiceError::invalid_state(format!(
                "match {match_id} is {}, points can only be added in progress",
                match_row.status.as_str()
            )));
        }

        if self.settings.require_expected_version && expected_version.is_none() {
            return Err(ServiceError::validation("expected version is required"));
        }
        if let Some(expected) = expected_version {
            if expected != match_row.version {
                return Err(ServiceError::Conflict { match_id });
            }
        }

        // Same client key means the same tap delivered twice: hand back the
        // stored point without touching the ledger or the version.
        if let Some(existing) = database::points::find_by_client_key(conn, match_id, client_key)
            .map_err(ServiceError::dependency("check client key"))?
        {
            debug!("Replayed point {} for match {match_id}", existing.id);
            let (game_count_a, game_count_b) = self.current_aggregate(conn, match_id)?;
            return Ok(PointOutcome {
                point: existing,
                version: match_row.version,
                game_count_a,
                game_count_b,
            });
        }

        let point = database::points::insert_point(conn, match_id, point_type, client_key)
            .map_err(ServiceError::dependency("insert point"))?;

        let (game_count_a, game_count_b) = self.recompute_aggregate(conn, match_id)?;

        let advanced = database::matches::bump_version_guarded(conn, match_id, match_row.version)
            .map_err(ServiceError::dependency("advance version"))?;
        if !advanced {
            info!("Version CAS lost for match {match_id}, point {} kept", point.id);
            return Err(ServiceError::Conflict { match_id });
        }

        Ok(PointOutcome {
            point,
            version: match_row.version + 1,
            game_count_a,
            game_count_b,
        })
    }

    /// Soft-undo of the latest live point. Same version discipline as
    /// `add_point`.
    pub fn undo_last_point(
        &self,
        conn: &mut DbConn,
        match_id: i64,
        expected_version: Option<i64>,
    ) -> ServiceResult<PointOutcome> {
        let match_row = database::matches::find_by_id(conn, match_id)
            .map_err(ServiceError::dependency("load match"))?
            .ok_or(ServiceError::NotFound("match"))?;

        if match_row.status != MatchStatus::InProgress {
            return Err(ServiceError::invalid_state(format!(
                "match {match_id} is {}, points can only be undone in progress",
                match_row.status.as_str()
            )));
        }
        if let Some(expected) = expected_version {
            if expected != match_row.version {
                return Err(ServiceError::Conflict { match_id });
            }
        }

        let last = database::points::find_last_live(conn, match_id)
            .map_err(ServiceError::dependency("load last point"))?
            .ok_or(ServiceError::NotFound("point"))?;
        database::points::mark_undone(conn, last.id)
            .map_err(ServiceError::dependency("undo point"))?;

        let (game_count_a, game_count_b) = self.recompute_aggregate(conn, match_id)?;

        let advanced = database::matches::bump_version_guarded(conn, match_id, match_row.version)
            .map_err(ServiceError::dependency("advance version"))?;
        if !advanced {
            return Err(ServiceError::Conflict { match_id });
        }

        Ok(PointOutcome {
            point: last,
            version: match_row.version + 1,
            game_count_a,
            game_count_b,
        })
    }

    /// Folds the live point stream and writes the aggregate back. This is
    /// the only writer of `game_count_a/b` on a scoring path.
    fn recompute_aggregate(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<(i32, i32)> {
        let points = database::points::list_live_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load points"))?;
        let (game_count_a, game_count_b) = fold_points(&points);

        database::match_scores::get_or_create(conn, match_id)
            .map_err(ServiceError::dependency("create match score"))?;
        database::match_scores::update_games(conn, match_id, game_count_a, game_count_b)
            .map_err(ServiceError::dependency("store aggregate"))?;

        Ok((game_count_a, game_count_b))
    }

    fn current_aggregate(&self, conn: &mut DbConn, match_id: i64) -> ServiceResult<(i32, i32)> {
        let score = database::match_scores::find_by_match(conn, match_id)
            .map_err(ServiceError::dependency("load match score"))?;
        Ok(score
            .map(|s| (s.game_count_a, s.game_count_b))
            .unwrap_or((0, 0)))
    }
}

/// Pure fold over the live point stream in receipt order, partitioned by
/// point type.
fn fold_points(points: &[Point]) -> (i32, i32) {
    points.iter().fold((0, 0), |(a, b), point| match point.point_type {
        PointKind::AScore => (a + 1, b),
        PointKind::BScore => (a, b + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Point;
    use crate::domain::models::PointKind;

    fn point(point_type: PointKind) -> Point {
        Point {
            id: 0,
            match_id: 1,
            point_type,
            client_key: String::new(),
            undone: false,
            recorded_at: None,
        }
    }

    #[test]
    fn fold_counts_points_per_side() {
        let points = vec![
            point(PointKind::AScore),
            point(PointKind::BScore),
            point(PointKind::AScore),
            point(PointKind::AScore),
        ];
        assert_eq!(fold_points(&points), (3, 1));
    }

    #[test]
    fn fold_of_empty_stream_is_zero() {
        assert_eq!(fold_points(&[]), (0, 0));
    }

    use uuid::Uuid;

    use crate::database;
    use crate::database::DbConn;
    use crate::services::fixtures;
    use crate::services::match_flow::MatchFlowService;

    fn service() -> ScoringService {
        ScoringService::new(ScoringSettings::default())
    }

    fn started_match(conn: &mut DbConn) -> i64 {
        let (_, summary) = fixtures::singles_draw(conn, 4);
        let first = database::matches::list_bracket_by_phase(conn, summary.phase_id)
            .unwrap()
            .into_iter()
            .find(|m| m.round == 1)
            .unwrap();
        MatchFlowService::new().start_match(conn, first.id).unwrap();
        first.id
    }

    fn key() -> String {
        Uuid::new_v4().to_string()
    }

    #[test]
    fn add_point_rejects_a_match_that_is_not_in_progress() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let (_, summary) = fixtures::singles_draw(&mut conn, 4);
        let pending = database::matches::list_bracket_by_phase(&mut conn, summary.phase_id)
            .unwrap()
            .into_iter()
            .find(|m| m.round == 1)
            .unwrap();

        let err = service()
            .add_point(&mut conn, pending.id, PointKind::AScore, &key(), None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        // No side effects: no point row, version untouched.
        assert!(database::points::list_live_by_match(&mut conn, pending.id)
            .unwrap()
            .is_empty());
        let refreshed = database::matches::find_by_id(&mut conn, pending.id)
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.version, pending.version);
    }

    #[test]
    fn stale_expected_version_conflicts_and_a_retry_lands() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let match_id = started_match(&mut conn);

        // Two scorers read version 0; the first write wins.
        let first = service()
            .add_point(&mut conn, match_id, PointKind::AScore, &key(), Some(0))
            .unwrap();
        assert_eq!(first.version, 1);

        let err = service()
            .add_point(&mut conn, match_id, PointKind::BScore, &key(), Some(0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
        assert_eq!(
            database::points::list_live_by_match(&mut conn, match_id)
                .unwrap()
                .len(),
            1
        );

        // The loser refetches and retries against the new version.
        let retried = service()
            .add_point(&mut conn, match_id, PointKind::BScore, &key(), Some(1))
            .unwrap();
        assert_eq!(retried.version, 2);
        assert_eq!((retried.game_count_a, retried.game_count_b), (1, 1));
        assert_eq!(
            database::points::list_live_by_match(&mut conn, match_id)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn version_cas_is_won_exactly_once_per_value() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let match_id = started_match(&mut conn);

        assert!(database::matches::bump_version_guarded(&mut conn, match_id, 0).unwrap());
        // A second writer holding the same stale version loses.
        assert!(!database::matches::bump_version_guarded(&mut conn, match_id, 0).unwrap());
        assert!(database::matches::bump_version_guarded(&mut conn, match_id, 1).unwrap());
    }

    #[test]
    fn replayed_client_key_returns_the_stored_point() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let match_id = started_match(&mut conn);

        let client_key = key();
        let first = service()
            .add_point(&mut conn, match_id, PointKind::AScore, &client_key, None)
            .unwrap();
        let replay = service()
            .add_point(&mut conn, match_id, PointKind::AScore, &client_key, None)
            .unwrap();

        assert_eq!(replay.point.id, first.point.id);
        assert_eq!(replay.version, first.version);
        assert_eq!(
            database::points::list_live_by_match(&mut conn, match_id)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn undo_removes_the_last_point_from_the_aggregate() {
        let pool = fixtures::pool();
        let mut conn = pool.get().unwrap();
        let match_id = started_match(&mut conn);

        service()
            .add_point(&mut conn, match_id, PointKind::AScore, &key(), None)
            .unwrap();
        service()
            .add_point(&mut conn, match_id, PointKind::AScore, &key(), None)
            .unwrap();
        let third = service()
            .add_point(&mut conn, match_id, PointKind::BScore, &key(), None)
            .unwrap();
        assert_eq!((third.game_count_a, third.game_count_b), (2, 1));

        let undone = service().undo_last_point(&mut conn, match_id, None).unwrap();
        assert_eq!(undone.point.id, third.point.id);
        assert_eq!(undone.version, 4);
        assert_eq!((undone.game_count_a, undone.game_count_b), (2, 0));

        // Soft-undo: the row stays, flagged.
        assert_eq!(
            database::points::list_live_by_match(&mut conn, match_id)
                .unwrap()
                .len(),
            2
        );
    }
}
