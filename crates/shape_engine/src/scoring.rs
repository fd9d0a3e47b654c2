//! Match scoring: one calendar day judged as Victory, Draw or Defeat.
//!
//! Uses the same calorie/weight checks as the day-status classifier but
//! with the flat weight tolerance only. The classifier grants sleep
//! forgiveness on the scale; the match judge does not. That asymmetry is
//! intentional: sleep softens how a day looks, not how it scores.

use crate::status;
use rand::Rng;
use shape_common::constants::{coach, ScoringConfig, PROMOTION_MODE_LP};
use shape_common::types::{DailyLog, MatchResult, UserProfile};

/// Result of judging one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub lp_delta: i32,
}

/// Promotion mode is armed when the flag is on and the player sits at the
/// top of the LP band.
pub fn is_promotion_mode(profile: &UserProfile, lp: i32) -> bool {
    profile.promotion_mode_enabled && lp >= PROMOTION_MODE_LP
}

/// Judge a merged daily log. `lp` is the ledger LP before application, used
/// only to decide promotion-mode doubling.
pub fn score_day(
    log: &DailyLog,
    profile: &UserProfile,
    scoring: &ScoringConfig,
    lp: i32,
) -> MatchOutcome {
    let cal_ok = status::calorie_ok(log, profile);
    let wt_ok = status::weight_ok(log, profile, scoring.weight_tolerance_kg);

    let (mut result, mut delta) = match (cal_ok, wt_ok) {
        (true, true) => (MatchResult::Victory, scoring.lp_win_perfect),
        (false, false) => (MatchResult::Defeat, scoring.lp_loss_severe),
        _ => (MatchResult::Draw, scoring.lp_win_ok),
    };

    // A day without any calorie record cannot be won.
    if log.calories.is_none() {
        result = MatchResult::Defeat;
    }

    // Grace always wins, even over the no-calories override.
    if log.grace_used {
        result = MatchResult::Draw;
        delta = 0;
    }

    if is_promotion_mode(profile, lp) {
        delta *= scoring.promotion_multiplier;
    }

    MatchOutcome {
        result,
        lp_delta: delta,
    }
}

/// Pick a coach line for the day from the template bank. Selection is keyed
/// by a rough classification of the day, independent of the match result.
pub fn coach_line<R: Rng + ?Sized>(
    rng: &mut R,
    log: &DailyLog,
    profile: &UserProfile,
    scoring: &ScoringConfig,
) -> String {
    if log.calories.is_none() && log.weight.is_none() && log.sleep_hours.is_none() {
        return coach::FRESH_DAY.to_string();
    }

    let cal_ok = status::calorie_ok(log, profile);
    let slept_well = status::sleep_ok(log, profile);

    if log.calories.is_some() && cal_ok && slept_well {
        return pick(rng, coach::PERFECT);
    }
    if log.calories.is_some() && cal_ok {
        return pick(rng, coach::GOOD_DIET);
    }
    if log.weight.is_some() && !status::weight_ok(log, profile, scoring.weight_tolerance_kg) {
        return pick(rng, coach::WEIGHT_SLIP);
    }
    if log.sleep_hours.is_some() && !slept_well {
        return pick(rng, coach::SLEEP_LOW);
    }
    if log.calories.is_some() && !cal_ok {
        return coach::TARGET_MISSED.to_string();
    }

    coach::DEFAULT.to_string()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, templates: &[&str]) -> String {
    templates[rng.gen_range(0..templates.len())].to_string()
}
