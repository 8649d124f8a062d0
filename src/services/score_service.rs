//! Point and serve mutations on the live set.

use crate::{
    error::EngineError,
    state::match_state::{Match, TeamSide, Timestamp},
};

/// Result of a serve correction; `changed` is false for a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeChange {
    /// False when the serve was already with the team.
    pub changed: bool,
    /// Match after the change, equal to the input for a no-op.
    pub next: Match,
}

fn ensure_in_progress(game: &Match) -> Result<(), EngineError> {
    if game.current_set.is_in_progress() {
        Ok(())
    } else {
        Err(EngineError::SetNotStarted)
    }
}

/// Add `delta` points to `team`, never going below zero.
///
/// A scored point hands the serve to the scorer; corrections leave it alone.
/// A total beyond the `u32` range is rejected.
pub fn change_score(
    game: &Match,
    team: TeamSide,
    delta: i64,
    now: Timestamp,
) -> Result<Match, EngineError> {
    ensure_in_progress(game)?;

    let mut next = game.clone();
    let score = next.current_set.set.score_mut(team);
    let updated = i64::from(*score).saturating_add(delta).max(0);
    *score = u32::try_from(updated).map_err(|_| {
        EngineError::ValidationFailed(vec![format!(
            "Score for team {team} cannot exceed {}",
            u32::MAX
        )])
    })?;

    if delta > 0 {
        next.current_set.serving_team = team;
    }
    next.updated_at = now;

    Ok(next)
}

/// Hand the serve to `team`.
pub fn change_serving_team(
    game: &Match,
    team: TeamSide,
    now: Timestamp,
) -> Result<ServeChange, EngineError> {
    ensure_in_progress(game)?;

    if game.current_set.serving_team == team {
        return Ok(ServeChange {
            changed: false,
            next: game.clone(),
        });
    }

    let mut next = game.clone();
    next.current_set.serving_team = team;
    next.updated_at = now;

    Ok(ServeChange {
        changed: true,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::match_state::{SetStatus, Team, Variant};

    fn live_match() -> Match {
        let mut game = Match::new(Variant::Indoor, Team::named("A"), Team::named("B"), 0);
        game.current_set.set.status = SetStatus::InProgress;
        game.current_set.set.start_time = Some(0);
        game
    }

    #[test]
    fn scoring_requires_started_set() {
        let game = Match::new(Variant::Indoor, Team::named("A"), Team::named("B"), 0);
        assert_eq!(
            change_score(&game, TeamSide::A, 1, 5),
            Err(EngineError::SetNotStarted)
        );
        assert_eq!(
            change_serving_team(&game, TeamSide::B, 5),
            Err(EngineError::SetNotStarted)
        );
    }

    #[test]
    fn point_moves_serve_to_scorer() {
        let game = live_match();
        let next = change_score(&game, TeamSide::B, 1, 10).unwrap();
        assert_eq!(next.current_set.set.score_b, 1);
        assert_eq!(next.current_set.serving_team, TeamSide::B);
        assert_eq!(next.updated_at, 10);
        // Nothing outside the live set changes.
        assert_eq!(next.sets, game.sets);
        assert_eq!(next.team_a, game.team_a);
    }

    #[test]
    fn correction_keeps_serve_and_floors_at_zero() {
        let mut game = live_match();
        game.current_set.serving_team = TeamSide::B;
        game.current_set.set.score_a = 1;

        let once = change_score(&game, TeamSide::A, -1, 1).unwrap();
        assert_eq!(once.current_set.set.score_a, 0);
        assert_eq!(once.current_set.serving_team, TeamSide::B);

        let twice = change_score(&once, TeamSide::A, -1, 2).unwrap();
        assert_eq!(twice.current_set.set.score_a, 0);
        assert_eq!(twice.current_set.serving_team, TeamSide::B);
    }

    #[test]
    fn extreme_deltas_never_overflow() {
        let mut game = live_match();
        game.current_set.set.score_a = 3;

        let err = change_score(&game, TeamSide::A, i64::MAX, 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::ValidationFailed(vec!["Score for team A cannot exceed 4294967295".into()])
        );

        let floored = change_score(&game, TeamSide::A, i64::MIN, 1).unwrap();
        assert_eq!(floored.current_set.set.score_a, 0);

        let big = change_score(&game, TeamSide::A, i64::from(u32::MAX) - 3, 1).unwrap();
        assert_eq!(big.current_set.set.score_a, u32::MAX);
    }

    #[test]
    fn serve_change_reports_no_op() {
        let game = live_match();
        let same = change_serving_team(&game, TeamSide::A, 3).unwrap();
        assert!(!same.changed);
        assert_eq!(same.next, game);

        let moved = change_serving_team(&game, TeamSide::B, 3).unwrap();
        assert!(moved.changed);
        assert_eq!(moved.next.current_set.serving_team, TeamSide::B);
        assert_eq!(moved.next.updated_at, 3);
    }
}
