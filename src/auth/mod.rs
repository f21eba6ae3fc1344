use anyhow::Result;

use crate::database::{self, DbConn};

/// Global administrator flag on the user row.
pub fn is_admin(conn: &mut DbConn, user_id: i64) -> Result<bool> {
    let user = database::users::find_by_id(conn, user_id)?;
    Ok(user.is_some_and(|u| u.is_admin))
}

/// Admins qualify everywhere; otherwise a per-tournament grant is required.
pub fn is_tournament_admin(conn: &mut DbConn, user_id: i64, tournament_id: i64) -> Result<bool> {
    if is_admin(conn, user_id)? {
        return Ok(true);
    }
    database::users::has_tournament_admin_grant(conn, user_id, tournament_id)
}

/// Whether the user may umpire the given match: assigned to it directly,
/// registered as a tournament umpire, or a (tournament) admin.
pub fn is_umpire(
    conn: &mut DbConn,
    user_id: i64,
    tournament_id: i64,
    match_id: i64,
) -> Result<bool> {
    if is_tournament_admin(conn, user_id, tournament_id)? {
        return Ok(true);
    }

    if let Some(match_row) = database::matches::find_by_id(conn, match_id)? {
        if match_row.umpire_user_id == Some(user_id) {
            return Ok(true);
        }
    }

    database::users::has_umpire_grant(conn, user_id, tournament_id)
}
