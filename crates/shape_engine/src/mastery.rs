//! Mastery XP: five independent counters, one per logging category.
//!
//! Every scoring pass awards XP for each metric present in the merged log,
//! with a bonus when the value also hits its target. Weight never gets a
//! hit bonus; showing up on the scale is the whole skill. Counters only
//! ever increase; levels come from a fixed ascending threshold table.

use shape_common::constants::{mastery_xp, MASTERY_THRESHOLDS};
use shape_common::types::{DailyLog, MasteryState, UserProfile};

/// Level for an XP total: 1-indexed count of thresholds reached.
pub fn level_for_xp(xp: u32) -> u32 {
    MASTERY_THRESHOLDS.iter().filter(|&&t| xp >= t).count() as u32
}

/// XP still needed to enter the next level, or `None` at the cap.
pub fn xp_to_next(xp: u32) -> Option<u32> {
    MASTERY_THRESHOLDS
        .iter()
        .find(|&&t| t > xp)
        .map(|&t| t - xp)
}

/// Settle a day after a submission merged into it: credit the difference
/// between what the merged log is worth and what the day was worth before.
/// Counters never go down; a metric edited away from its target simply
/// stops earning.
pub fn settle(
    mastery: &MasteryState,
    before: Option<&DailyLog>,
    after: &DailyLog,
    profile: &UserProfile,
) -> MasteryState {
    let zero = MasteryState::default();
    let prior = before.map_or(zero, |log| award(&zero, log, profile));
    let fresh = award(&zero, after, profile);

    let mut next = *mastery;
    next.calories += fresh.calories.saturating_sub(prior.calories);
    next.sleep += fresh.sleep.saturating_sub(prior.sleep);
    next.steps += fresh.steps.saturating_sub(prior.steps);
    next.weight += fresh.weight.saturating_sub(prior.weight);
    next.reflection += fresh.reflection.saturating_sub(prior.reflection);
    next
}

/// Award XP for every metric present on the merged log.
pub fn award(mastery: &MasteryState, log: &DailyLog, profile: &UserProfile) -> MasteryState {
    let mut next = *mastery;

    if let Some(calories) = log.calories {
        next.calories += mastery_xp::LOG_CALORIES;
        if calories <= profile.calorie_target {
            next.calories += mastery_xp::UNDER_TARGET;
        }
    }
    if let Some(sleep) = log.sleep_hours {
        next.sleep += mastery_xp::LOG_SLEEP;
        if sleep >= profile.sleep_target_hours {
            next.sleep += mastery_xp::HIT_SLEEP;
        }
    }
    if let Some(steps) = log.steps {
        next.steps += mastery_xp::LOG_STEPS;
        if steps >= profile.target_steps {
            next.steps += mastery_xp::HIT_STEPS;
        }
    }
    if log.weight.is_some() {
        next.weight += mastery_xp::LOG_WEIGHT;
    }
    if log.reflection.as_deref().map_or(false, |r| !r.is_empty()) {
        next.reflection += mastery_xp::REFLECTION;
    }

    next
}
