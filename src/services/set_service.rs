//! Set lifecycle: start, finish, retroactive edits and reopening.

use crate::{
    error::EngineError,
    services::validation::{has_next_set, validate_set_update},
    state::{
        match_state::{CurrentSet, Match, SetRecord, SetStatus, TeamSide, Timestamp},
        rules::RulesTable,
        state_machine::{SetStateMachine, TransitionContext},
        update::{FieldUpdate, SetUpdate},
    },
};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Where a set number lives inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetTarget {
    /// The live set slot.
    Current,
    /// Index into the completed-sets list.
    Completed(usize),
}

/// Rounded whole minutes between two timestamps.
///
/// `None` when a bound is missing or the span does not fit in an `i64`.
pub fn duration_minutes(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<i64> {
    let span = end?.checked_sub(start?)?;
    Some((span as f64 / MILLIS_PER_MINUTE).round() as i64)
}

/// Resolve set `set_number`.
///
/// A finished set whose number is still held by the pending live slot resolves
/// to the completed record, which is the one carrying the result.
pub fn locate_set(game: &Match, set_number: u32) -> Result<SetTarget, EngineError> {
    let current = &game.current_set;
    if current.set_number() == set_number && current.status() != SetStatus::Pending {
        return Ok(SetTarget::Current);
    }

    if let Some(index) = game
        .sets
        .iter()
        .position(|set| set.set_number == set_number)
    {
        return Ok(SetTarget::Completed(index));
    }

    if current.set_number() == set_number {
        return Ok(SetTarget::Current);
    }

    Err(EngineError::SetNotFound(set_number))
}

/// Borrow set `set_number`, live or completed.
pub fn find_set(game: &Match, set_number: u32) -> Result<&SetRecord, EngineError> {
    Ok(match locate_set(game, set_number)? {
        SetTarget::Current => &game.current_set.set,
        SetTarget::Completed(index) => &game.sets[index],
    })
}

/// Begin the next set: 0-0, in progress, stamped with `now`.
pub fn start_set(game: &Match, now: Timestamp) -> Result<Match, EngineError> {
    let current = &game.current_set;
    if current.status() != SetStatus::Pending {
        return Err(EngineError::SetAlreadyActiveOrFinished);
    }

    // Before any set is archived the pending slot already carries the number.
    let set_number = game
        .last_set_number()
        .map_or(current.set_number(), |last| last + 1);

    let mut next = game.clone();
    next.current_set.set = SetRecord {
        set_number,
        score_a: 0,
        score_b: 0,
        status: SetStatus::InProgress,
        start_time: Some(now),
        end_time: None,
        duration: None,
    };
    next.updated_at = now;

    Ok(next)
}

/// Close the live set and archive it.
///
/// The live slot keeps the final score until the next [`start_set`] so that
/// displays keep showing the result between sets.
pub fn finish_set(game: &Match, now: Timestamp) -> Result<Match, EngineError> {
    let current = &game.current_set;
    if !current.is_in_progress() {
        return Err(EngineError::SetNotStarted);
    }

    let rules = RulesTable::new(game.variant);
    let set = &current.set;
    if !rules.can_finish_set(set.score_a, set.score_b, set.set_number) {
        return Err(EngineError::SetNotFinishable {
            required: rules.points_to_win(set.set_number),
        });
    }

    let end_time = Some(now);
    let record = SetRecord {
        set_number: set.set_number,
        score_a: set.score_a,
        score_b: set.score_b,
        status: SetStatus::Completed,
        start_time: set.start_time,
        end_time,
        duration: duration_minutes(set.start_time, end_time),
    };

    let mut next = game.clone();
    next.sets.push(record);

    let live = &mut next.current_set;
    live.set.status = SetStatus::Pending;
    live.set.start_time = None;
    live.set.end_time = None;
    live.set.duration = None;
    live.serving_team = rules
        .set_winner(set.score_a, set.score_b)
        .unwrap_or(TeamSide::A);
    next.updated_at = now;

    Ok(next)
}

/// Apply a validated edit to any set, live or historical.
pub fn update_set(
    game: &Match,
    set_number: u32,
    update: &SetUpdate,
    now: Timestamp,
) -> Result<Match, EngineError> {
    let target = locate_set(game, set_number)?;
    let base = match target {
        SetTarget::Current => &game.current_set.set,
        SetTarget::Completed(index) => &game.sets[index],
    };

    validate_set_update(game, base, update).into_result()?;
    let status = update.final_status(base);

    match target {
        SetTarget::Current => {
            let mut next = game.clone();
            apply_update(&mut next.current_set.set, update)?;
            next.updated_at = now;
            Ok(next)
        }
        SetTarget::Completed(_) if status == SetStatus::InProgress => {
            reopen_set(game, set_number, update, now)
        }
        SetTarget::Completed(index) => {
            let mut next = game.clone();
            apply_update(&mut next.sets[index], update)?;
            if next.current_set.status() == SetStatus::Completed {
                next.current_set.set.status = SetStatus::Pending;
            }
            next.updated_at = now;
            Ok(next)
        }
    }
}

/// Move completed set `set_number` back into the live slot.
///
/// Requires that no later set exists or is being played. The reopened set
/// keeps its number and score, takes the start time from `update` when given,
/// and keeps the match's current serving team.
pub fn reopen_set(
    game: &Match,
    set_number: u32,
    update: &SetUpdate,
    now: Timestamp,
) -> Result<Match, EngineError> {
    let index = game
        .sets
        .iter()
        .position(|set| set.set_number == set_number && set.is_completed())
        .ok_or(EngineError::SetNotFound(set_number))?;

    let context = TransitionContext {
        has_next_set: has_next_set(game, set_number),
    };
    SetStateMachine::transition(SetStatus::Completed, SetStatus::InProgress, context)?;

    if game.current_set.is_in_progress() {
        return Err(EngineError::ValidationFailed(vec![format!(
            "Set {} is in progress; finish it before reopening set {set_number}",
            game.current_set.set_number()
        )]));
    }

    let reopen = SetUpdate {
        status: Some(SetStatus::InProgress),
        end_time: FieldUpdate::Clear,
        ..update.clone()
    };

    let mut next = game.clone();
    let mut record = next.sets.remove(index);
    apply_update(&mut record, &reopen)?;

    next.current_set = CurrentSet {
        set: record,
        serving_team: game.current_set.serving_team,
    };
    next.updated_at = now;

    Ok(next)
}

fn apply_update(record: &mut SetRecord, update: &SetUpdate) -> Result<(), EngineError> {
    let (score_a, score_b) = update.final_scores(record);
    let (start_time, end_time) = update.final_times(record);
    let status = update.final_status(record);

    record.score_a = to_score(TeamSide::A, score_a)?;
    record.score_b = to_score(TeamSide::B, score_b)?;
    record.start_time = start_time;
    record.end_time = end_time;
    record.status = status;
    // Only a completed set keeps an end time.
    SetStateMachine::clear_times(record, status);

    if update.touches_times() || update.status.is_some() {
        record.duration = duration_minutes(record.start_time, record.end_time);
    }

    Ok(())
}

fn to_score(team: TeamSide, value: i64) -> Result<u32, EngineError> {
    u32::try_from(value).map_err(|_| {
        EngineError::ValidationFailed(vec![format!(
            "Score for team {team} must be between 0 and {}",
            u32::MAX
        )])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::match_state::{Team, Variant};

    const MINUTE: Timestamp = 60_000;

    fn new_match(variant: Variant) -> Match {
        Match::new(variant, Team::named("Home"), Team::named("Away"), 0)
    }

    fn with_score(game: &Match, score_a: u32, score_b: u32) -> Match {
        let mut next = game.clone();
        next.current_set.set.score_a = score_a;
        next.current_set.set.score_b = score_b;
        next
    }

    /// Play set after set, each `MINUTE * 20` long with a 5 minute break.
    fn play_sets(variant: Variant, scores: &[(u32, u32)]) -> Match {
        let mut game = new_match(variant);
        let mut clock = 0;
        for &(a, b) in scores {
            game = start_set(&game, clock).unwrap();
            game = with_score(&game, a, b);
            clock += 20 * MINUTE;
            game = finish_set(&game, clock).unwrap();
            clock += 5 * MINUTE;
        }
        game
    }

    #[test]
    fn duration_rounds_to_minutes() {
        assert_eq!(duration_minutes(Some(0), Some(90_000)), Some(2));
        assert_eq!(duration_minutes(Some(0), Some(89_999)), Some(1));
        assert_eq!(duration_minutes(None, Some(10)), None);
        assert_eq!(duration_minutes(Some(10), None), None);
        assert_eq!(duration_minutes(Some(i64::MIN), Some(i64::MAX)), None);
    }

    #[test]
    fn extreme_timestamps_leave_duration_empty() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        let update = SetUpdate {
            start_time: FieldUpdate::Set(i64::MIN),
            end_time: FieldUpdate::Set(i64::MAX),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 0).unwrap();
        assert_eq!(next.sets[0].start_time, Some(i64::MIN));
        assert_eq!(next.sets[0].end_time, Some(i64::MAX));
        assert_eq!(next.sets[0].duration, None);

        let live = start_set(&new_match(Variant::Indoor), 0).unwrap();
        assert!(matches!(
            update_set(&live, 1, &update, 0),
            Err(EngineError::ValidationFailed(_))
        ));
    }

    #[test]
    fn start_resets_score_and_stamps_time() {
        let game = with_score(&new_match(Variant::Indoor), 4, 2);
        let started = start_set(&game, 1_000).unwrap();
        let live = &started.current_set.set;
        assert_eq!(live.set_number, 1);
        assert_eq!((live.score_a, live.score_b), (0, 0));
        assert_eq!(live.status, SetStatus::InProgress);
        assert_eq!(live.start_time, Some(1_000));

        assert_eq!(
            start_set(&started, 2_000),
            Err(EngineError::SetAlreadyActiveOrFinished)
        );
    }

    #[test]
    fn finish_archives_and_keeps_score() {
        let game = start_set(&new_match(Variant::Indoor), 0).unwrap();
        let game = with_score(&game, 23, 25);
        let finished = finish_set(&game, 25 * MINUTE).unwrap();

        assert_eq!(finished.sets.len(), 1);
        let record = &finished.sets[0];
        assert_eq!((record.score_a, record.score_b), (23, 25));
        assert_eq!(record.status, SetStatus::Completed);
        assert_eq!(record.duration, Some(25));

        let live = &finished.current_set;
        assert_eq!(live.status(), SetStatus::Pending);
        assert_eq!((live.set.score_a, live.set.score_b), (23, 25));
        assert_eq!(live.set.start_time, None);
        assert_eq!(live.serving_team, TeamSide::B);

        let next = start_set(&finished, 30 * MINUTE).unwrap();
        assert_eq!(next.current_set.set_number(), 2);
        assert_eq!((next.current_set.set.score_a, next.current_set.set.score_b), (0, 0));
    }

    #[test]
    fn finish_requires_finishable_score() {
        let game = start_set(&new_match(Variant::Beach), 0).unwrap();
        let err = finish_set(&with_score(&game, 21, 20), 10).unwrap_err();
        assert_eq!(err, EngineError::SetNotFinishable { required: 21 });
        assert!(err.to_string().contains("21 points"));

        assert_eq!(
            finish_set(&new_match(Variant::Beach), 10),
            Err(EngineError::SetNotStarted)
        );
    }

    #[test]
    fn unknown_set_is_not_found() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        assert_eq!(
            update_set(&game, 4, &SetUpdate::default(), 0),
            Err(EngineError::SetNotFound(4))
        );
        assert_eq!(find_set(&game, 4), Err(EngineError::SetNotFound(4)));
    }

    #[test]
    fn finished_set_resolves_to_completed_record() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        assert_eq!(locate_set(&game, 1), Ok(SetTarget::Completed(0)));

        let live = start_set(&game, 30 * MINUTE).unwrap();
        assert_eq!(locate_set(&live, 2), Ok(SetTarget::Current));
    }

    #[test]
    fn editing_completed_score_keeps_live_set() {
        let game = play_sets(Variant::Indoor, &[(25, 20), (25, 22)]);
        let game = start_set(&game, 60 * MINUTE).unwrap();
        let update = SetUpdate {
            score_b: Some(23),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 61 * MINUTE).unwrap();
        assert_eq!(next.sets[0].score_b, 23);
        assert_eq!(next.sets[0].status, SetStatus::Completed);
        assert_eq!(next.current_set, game.current_set);
        assert_eq!(next.updated_at, 61 * MINUTE);
    }

    #[test]
    fn editing_times_recomputes_duration() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        let update = SetUpdate {
            end_time: FieldUpdate::Set(31 * MINUTE),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 0).unwrap();
        assert_eq!(next.sets[0].duration, Some(31));
    }

    #[test]
    fn overlapping_edit_is_rejected() {
        let game = play_sets(Variant::Indoor, &[(25, 20), (25, 22)]);
        let update = SetUpdate {
            end_time: FieldUpdate::Set(30 * MINUTE),
            ..SetUpdate::default()
        };

        let err = update_set(&game, 1, &update, 0).unwrap_err();
        assert_eq!(
            err,
            EngineError::ValidationFailed(vec!["Set 1 overlaps with set 2".into()])
        );
    }

    #[test]
    fn reopen_moves_record_into_live_slot() {
        let game = play_sets(Variant::Indoor, &[(25, 20), (22, 25)]);
        let next = update_set(&game, 2, &SetUpdate::reopen(), 0).unwrap();

        assert_eq!(next.sets.len(), 1);
        assert!(next.find_completed_set(2).is_none());
        let live = &next.current_set;
        assert_eq!(live.set_number(), 2);
        assert_eq!((live.set.score_a, live.set.score_b), (22, 25));
        assert_eq!(live.status(), SetStatus::InProgress);
        assert_eq!(live.set.start_time, Some(25 * MINUTE));
        assert_eq!(live.set.end_time, None);
        assert_eq!(live.set.duration, None);
        assert_eq!(live.serving_team, game.current_set.serving_team);
    }

    #[test]
    fn reopen_takes_new_start_time() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        let update = SetUpdate {
            start_time: FieldUpdate::Set(3 * MINUTE),
            ..SetUpdate::reopen()
        };

        let next = update_set(&game, 1, &update, 0).unwrap();
        assert_eq!(next.current_set.set.start_time, Some(3 * MINUTE));
    }

    #[test]
    fn reopen_is_blocked_once_a_later_set_exists() {
        let game = play_sets(Variant::Indoor, &[(25, 20), (22, 25)]);
        let err = update_set(&game, 1, &SetUpdate::reopen(), 0).unwrap_err();
        assert_eq!(
            err,
            EngineError::ValidationFailed(vec![
                "Cannot change set status from completed to in_progress".into()
            ])
        );

        let live = start_set(&play_sets(Variant::Indoor, &[(25, 20)]), 30 * MINUTE).unwrap();
        assert!(update_set(&live, 1, &SetUpdate::reopen(), 0).is_err());
        assert!(reopen_set(&live, 1, &SetUpdate::reopen(), 0).is_err());
    }

    #[test]
    fn updating_live_set_merges_in_place() {
        let game = start_set(&new_match(Variant::Indoor), 0).unwrap();
        let update = SetUpdate {
            score_a: Some(7),
            start_time: FieldUpdate::Set(MINUTE),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 5).unwrap();
        assert_eq!(next.current_set.set.score_a, 7);
        assert_eq!(next.current_set.set.start_time, Some(MINUTE));
        assert_eq!(next.current_set.status(), SetStatus::InProgress);
        assert!(next.sets.is_empty());
    }

    #[test]
    fn live_set_never_keeps_an_end_time() {
        let game = start_set(&new_match(Variant::Indoor), 0).unwrap();
        let update = SetUpdate {
            end_time: FieldUpdate::Set(9_000),
            ..SetUpdate::default()
        };

        let err = update_set(&game, 1, &update, 5).unwrap_err();
        assert_eq!(
            err,
            EngineError::ValidationFailed(vec!["Only a completed set can have an end time".into()])
        );

        let finished = play_sets(Variant::Indoor, &[(25, 20)]);
        let reopened = reopen_set(&finished, 1, &SetUpdate::default(), 0).unwrap();
        assert_eq!(reopened.current_set.set.end_time, None);
        assert_eq!(reopened.current_set.set.duration, None);
    }

    #[test]
    fn oversized_score_edit_is_rejected() {
        let game = play_sets(Variant::Indoor, &[(25, 20)]);
        let update = SetUpdate {
            score_a: Some(5_000_000_000),
            ..SetUpdate::default()
        };

        let err = update_set(&game, 1, &update, 0).unwrap_err();
        let EngineError::ValidationFailed(messages) = err else {
            panic!("expected a validation failure, got {err:?}");
        };
        assert_eq!(messages[0], "Score for team A cannot exceed 4294967295");

        let reopen = SetUpdate {
            score_b: Some(i64::from(u32::MAX) + 1),
            ..SetUpdate::reopen()
        };
        assert!(reopen_set(&game, 1, &reopen, 0).is_err());
    }

    #[test]
    fn live_set_marked_completed_is_recovered_by_reopening() {
        let game = start_set(&new_match(Variant::Indoor), 0).unwrap();
        let complete = SetUpdate {
            score_a: Some(25),
            score_b: Some(20),
            status: Some(SetStatus::Completed),
            end_time: FieldUpdate::Set(20 * MINUTE),
            ..SetUpdate::default()
        };

        let stuck = update_set(&game, 1, &complete, 20 * MINUTE).unwrap();
        assert_eq!(stuck.current_set.status(), SetStatus::Completed);
        assert!(stuck.sets.is_empty());
        assert_eq!(
            start_set(&stuck, 21 * MINUTE),
            Err(EngineError::SetAlreadyActiveOrFinished)
        );

        // The live slot still resolves by number, so it can be reopened in place
        // and then finished normally.
        let reopened = update_set(&stuck, 1, &SetUpdate::reopen(), 21 * MINUTE).unwrap();
        assert_eq!(reopened.current_set.status(), SetStatus::InProgress);
        assert_eq!(reopened.current_set.set.end_time, None);

        let finished = finish_set(&reopened, 22 * MINUTE).unwrap();
        assert_eq!(finished.sets.len(), 1);
        assert_eq!((finished.sets[0].score_a, finished.sets[0].score_b), (25, 20));
        assert!(start_set(&finished, 23 * MINUTE).is_ok());
    }

    #[test]
    fn cancelling_live_set_clears_times() {
        let game = start_set(&new_match(Variant::Indoor), MINUTE).unwrap();
        let update = SetUpdate {
            status: Some(SetStatus::Pending),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 5).unwrap();
        assert_eq!(next.current_set.status(), SetStatus::Pending);
        assert_eq!(next.current_set.set.start_time, None);
        assert_eq!(next.current_set.set.duration, None);
    }

    #[test]
    fn stray_completed_live_status_is_normalised() {
        let mut game = play_sets(Variant::Indoor, &[(25, 20), (25, 18)]);
        game.current_set.set.set_number = 3;
        game.current_set.set.status = SetStatus::Completed;
        let update = SetUpdate {
            score_a: Some(26),
            score_b: Some(24),
            ..SetUpdate::default()
        };

        let next = update_set(&game, 1, &update, 0).unwrap();
        assert_eq!(next.current_set.status(), SetStatus::Pending);
        assert_eq!((next.sets[0].score_a, next.sets[0].score_b), (26, 24));
    }
}
