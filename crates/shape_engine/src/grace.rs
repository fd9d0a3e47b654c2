//! Weekly grace budget and the weekly plan.
//!
//! Grace converts one already-logged bad day into a Draw, for coins, at most
//! once per ISO week. Using grace rewrites the day's stored verdict but never
//! retroactively touches the rank ledger; the protection is forward-looking.

use chrono::{DateTime, NaiveDate, Utc};
use shape_common::constants::ScoringConfig;
use shape_common::error::PolicyError;
use shape_common::state::GameState;
use shape_common::types::{ActivityEntry, ActivityKind, FocusArea, MatchResult, WeeklyPlan};
use shape_common::week;
use tracing::info;

/// Reset week-scoped state when the ISO week has rolled over: the grace
/// budget refills and a stale weekly plan is cleared.
pub fn roll_week(state: &mut GameState, today: NaiveDate) {
    let current = week::week_id(today);
    if state.grace.week_id != current {
        state.grace.count = 0;
        state.grace.week_id = current.clone();
    }
    if state
        .weekly_plan
        .as_ref()
        .map_or(false, |plan| plan.week_id != current)
    {
        state.weekly_plan = None;
    }
}

/// Spend coins to convert `date` into a graced Draw. All policy checks run
/// before any mutation.
pub fn use_grace_day(
    state: &mut GameState,
    scoring: &ScoringConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), PolicyError> {
    roll_week(state, now.date_naive());

    let Some(profile) = state.profile.as_ref() else {
        return Err(PolicyError::NotOnboarded);
    };
    let Some(log) = state.logs.get(&date) else {
        return Err(PolicyError::NoLogForDate(date));
    };
    if log.grace_used {
        return Err(PolicyError::AlreadyGraced);
    }
    if state.grace.count >= scoring.grace_limit_weekly {
        return Err(PolicyError::GraceLimitReached);
    }
    if profile.coins < scoring.grace_cost {
        return Err(PolicyError::InsufficientCoins {
            needed: scoring.grace_cost,
            have: profile.coins,
        });
    }

    let profile = state.profile.as_mut().unwrap();
    profile.coins -= scoring.grace_cost;
    state.grace.count += 1;

    let log = state.logs.get_mut(&date).unwrap();
    log.grace_used = true;
    log.match_result = Some(MatchResult::Draw);
    log.lp_change = Some(0);

    state.activity.insert(
        0,
        ActivityEntry {
            id: format!("grace-{date}"),
            date,
            timestamp: now,
            kind: ActivityKind::GraceUsed,
            message: format!("Grace day used for {date}"),
            value: None,
        },
    );
    info!(%date, "grace day applied");

    Ok(())
}

/// Record this week's commitment. Replaces any existing plan for the week.
pub fn set_weekly_plan(
    state: &mut GameState,
    focus: FocusArea,
    promise: &str,
    now: DateTime<Utc>,
) -> Result<(), PolicyError> {
    if state.profile.is_none() {
        return Err(PolicyError::NotOnboarded);
    }
    roll_week(state, now.date_naive());
    state.weekly_plan = Some(WeeklyPlan {
        week_id: week::week_id(now.date_naive()),
        focus,
        promise: promise.to_string(),
        created_at: now,
    });
    Ok(())
}
