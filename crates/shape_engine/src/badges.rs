//! Badge evaluation.
//!
//! Every badge still locked is re-evaluated against the entire history on
//! each scoring pass. Unlocking is terminal: progress freezes at the unlock
//! evaluation and the badge is skipped from then on.
//!
//! The consistency and early-riser predicates preserve the legacy behavior
//! exactly; the rest of the catalog is read off each badge's description.

use crate::status;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use shape_common::constants::ScoringConfig;
use shape_common::types::{
    ActivityEntry, ActivityKind, Badge, DailyLog, DayStatus, Quest, RankState, Tier, UserProfile,
};
use std::collections::BTreeMap;
use tracing::info;

/// Everything badge predicates may look at.
pub struct BadgeContext<'a> {
    pub logs: &'a BTreeMap<NaiveDate, DailyLog>,
    pub profile: &'a UserProfile,
    pub quests: &'a [Quest],
    pub rank: &'a RankState,
    pub activity: &'a [ActivityEntry],
    pub scoring: &'a ScoringConfig,
}

/// Re-evaluate all locked badges. Returns the updated list and the badges
/// that unlocked during this pass.
pub fn evaluate(
    badges: &[Badge],
    ctx: &BadgeContext<'_>,
    now: DateTime<Utc>,
) -> (Vec<Badge>, Vec<Badge>) {
    let mut unlocked = Vec::new();
    let updated = badges
        .iter()
        .map(|badge| {
            if badge.unlocked_at.is_some() {
                return badge.clone();
            }

            let progress = progress_for(badge, ctx);
            let mut next = badge.clone();
            next.progress = progress;
            if progress >= badge.target {
                next.unlocked_at = Some(now);
                info!(badge = %next.name, "badge unlocked");
                unlocked.push(next.clone());
            }
            next
        })
        .collect();

    (updated, unlocked)
}

fn progress_for(badge: &Badge, ctx: &BadgeContext<'_>) -> u32 {
    match badge.id.as_str() {
        "consistency" => trailing_calorie_streak(ctx.logs),
        "early_riser" => ctx
            .logs
            .values()
            .filter(|l| l.first_calorie_time.map_or(false, |t| t.hour() < 9))
            .count() as u32,
        "comeback" => {
            if has_comeback(ctx) {
                1
            } else {
                0
            }
        }
        "steady_hands" => trailing_non_red_days(ctx),
        "sleeper" => ctx
            .logs
            .values()
            .filter(|l| {
                l.sleep_hours
                    .map_or(false, |h| h >= ctx.profile.sleep_target_hours)
            })
            .count() as u32,
        "weight_track" => ctx
            .logs
            .values()
            .filter(|l| status::weight_ok(l, ctx.profile, ctx.scoring.weight_tolerance_kg))
            .count() as u32,
        "pathfinder" => ctx
            .logs
            .values()
            .filter(|l| l.steps.map_or(false, |s| s >= ctx.profile.target_steps))
            .count() as u32,
        "scribe" => ctx
            .logs
            .values()
            .filter(|l| l.reflection.as_deref().map_or(false, |r| !r.is_empty()))
            .count() as u32,
        "collector" => ctx.quests.iter().filter(|q| q.is_completed()).count() as u32,
        "iron_will" => {
            if ctx.rank.tier >= Tier::Bronze {
                1
            } else {
                0
            }
        }
        "climber" => ctx
            .activity
            .iter()
            .filter(|a| a.kind == ActivityKind::RankUp)
            .count() as u32,
        "finisher" => ctx.rank.total_lp.max(0).min(u32::MAX as i64) as u32,
        _ => 0,
    }
}

/// Unbroken run of calorie-logged days, counted backward from the most
/// recent log.
fn trailing_calorie_streak(logs: &BTreeMap<NaiveDate, DailyLog>) -> u32 {
    let mut streak = 0;
    for log in logs.values().rev() {
        if log.calories.is_some() {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Run of most-recent logged days whose status is not red.
fn trailing_non_red_days(ctx: &BadgeContext<'_>) -> u32 {
    let mut run = 0;
    for log in ctx.logs.values().rev() {
        if status::day_status(Some(log), ctx.profile, ctx.scoring) == DayStatus::Red {
            break;
        }
        run += 1;
    }
    run
}

/// Two consecutive red days followed immediately by three green days,
/// anywhere in history.
fn has_comeback(ctx: &BadgeContext<'_>) -> bool {
    let statuses: Vec<DayStatus> = ctx
        .logs
        .values()
        .map(|l| status::day_status(Some(l), ctx.profile, ctx.scoring))
        .collect();

    statuses.windows(5).any(|w| {
        w[0] == DayStatus::Red
            && w[1] == DayStatus::Red
            && w[2..].iter().all(|s| *s == DayStatus::Green)
    })
}
