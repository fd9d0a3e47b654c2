//! Day status classification.
//!
//! Pure functions over one day's log and the profile. The qualitative
//! status (green/yellow/red/gray) compares intake against target and weight
//! against a linear trend line between the starting weight and the goal.
//!
//! Good sleep widens the weight tolerance here. Match scoring deliberately
//! does NOT get that slack; see `scoring`.

use chrono::NaiveDate;
use shape_common::constants::ScoringConfig;
use shape_common::types::{DailyLog, DayStatus, UserProfile};

/// Weight the plan expects on `date`: linear interpolation between
/// (created_at, start_weight) and (target_date, target_weight), clamped to
/// the endpoints outside that range.
pub fn expected_weight(date: NaiveDate, profile: &UserProfile) -> f64 {
    let start = profile.created_at;
    let end = profile.target_date;
    if date <= start {
        return profile.start_weight;
    }
    if date >= end {
        return profile.target_weight;
    }
    let total = (end - start).num_days() as f64;
    let elapsed = (date - start).num_days() as f64;
    profile.start_weight + (profile.target_weight - profile.start_weight) * (elapsed / total)
}

/// Calories logged and at or under target.
pub fn calorie_ok(log: &DailyLog, profile: &UserProfile) -> bool {
    log.calories.map_or(false, |c| c <= profile.calorie_target)
}

/// Sleep logged and at or over target.
pub fn sleep_ok(log: &DailyLog, profile: &UserProfile) -> bool {
    log.sleep_hours
        .map_or(false, |h| h >= profile.sleep_target_hours)
}

/// Weight logged and within `tolerance` of the trend line, in the direction
/// that matters for the goal. No weight logged is never ok.
pub fn weight_ok(log: &DailyLog, profile: &UserProfile, tolerance: f64) -> bool {
    let Some(weight) = log.weight else {
        return false;
    };
    let expected = expected_weight(log.date, profile);
    if profile.is_loss_goal() {
        weight <= expected + tolerance
    } else {
        weight >= expected - tolerance
    }
}

/// Classify one day. `None` or a log without calories and weight is gray.
pub fn day_status(
    log: Option<&DailyLog>,
    profile: &UserProfile,
    scoring: &ScoringConfig,
) -> DayStatus {
    let Some(log) = log else {
        return DayStatus::Gray;
    };
    if log.calories.is_none() && log.weight.is_none() {
        return DayStatus::Gray;
    }

    let cal_ok = calorie_ok(log, profile);
    let slept_well = sleep_ok(log, profile);
    // Hitting the sleep target earns extra slack on the scale.
    let tolerance = scoring.weight_tolerance_kg
        + if slept_well {
            scoring.sleep_forgiveness_kg
        } else {
            0.0
        };
    let wt_ok = weight_ok(log, profile, tolerance);

    match (cal_ok, wt_ok) {
        (true, true) => {
            if log.sleep_hours.is_none() {
                DayStatus::Yellow
            } else {
                DayStatus::Green
            }
        }
        (true, false) | (false, true) => DayStatus::Yellow,
        (false, false) => DayStatus::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{log_for, loss_profile};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn expected_weight_interpolates_and_clamps() {
        // 90kg -> 80kg over 60 days starting 2026-01-01.
        let profile = loss_profile();
        assert!((expected_weight(d(2025, 12, 1), &profile) - 90.0).abs() < 1e-9);
        assert!((expected_weight(d(2026, 6, 1), &profile) - 80.0).abs() < 1e-9);
        let midway = expected_weight(d(2026, 1, 31), &profile);
        assert!((midway - 85.0).abs() < 0.01);
    }

    #[test]
    fn perfect_day_is_green() {
        let profile = loss_profile();
        let mut log = log_for(d(2026, 1, 2));
        log.calories = Some(1800);
        log.weight = Some(89.8);
        log.sleep_hours = Some(8.5);
        let status = day_status(Some(&log), &profile, &ScoringConfig::default());
        assert_eq!(status, DayStatus::Green);
    }

    #[test]
    fn perfect_day_without_sleep_is_only_yellow() {
        let profile = loss_profile();
        let mut log = log_for(d(2026, 1, 2));
        log.calories = Some(1800);
        log.weight = Some(89.8);
        let status = day_status(Some(&log), &profile, &ScoringConfig::default());
        assert_eq!(status, DayStatus::Yellow);
    }

    #[test]
    fn sleep_forgiveness_widens_weight_tolerance() {
        let profile = loss_profile();
        let scoring = ScoringConfig::default();
        // Just past flat tolerance (expected ~89.83 on day 1, +0.4 slack).
        let mut log = log_for(d(2026, 1, 2));
        log.calories = Some(1800);
        log.weight = Some(90.4);

        // Without sleep: weight misses, yellow.
        assert_eq!(day_status(Some(&log), &profile, &scoring), DayStatus::Yellow);

        // With target sleep the extra 0.2kg covers the gap; green.
        log.sleep_hours = Some(8.0);
        assert_eq!(day_status(Some(&log), &profile, &scoring), DayStatus::Green);
    }

    #[test]
    fn no_relevant_metrics_is_gray() {
        let profile = loss_profile();
        assert_eq!(
            day_status(None, &profile, &ScoringConfig::default()),
            DayStatus::Gray
        );
        let mut log = log_for(d(2026, 1, 2));
        log.steps = Some(9000);
        log.sleep_hours = Some(7.0);
        assert_eq!(
            day_status(Some(&log), &profile, &ScoringConfig::default()),
            DayStatus::Gray
        );
    }

    #[test]
    fn both_misses_are_red() {
        let profile = loss_profile();
        let mut log = log_for(d(2026, 1, 2));
        log.calories = Some(2600);
        log.weight = Some(91.5);
        assert_eq!(
            day_status(Some(&log), &profile, &ScoringConfig::default()),
            DayStatus::Red
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let profile = loss_profile();
        let mut log = log_for(d(2026, 1, 2));
        log.calories = Some(1900);
        log.weight = Some(89.9);
        log.sleep_hours = Some(8.0);
        let scoring = ScoringConfig::default();
        let first = day_status(Some(&log), &profile, &scoring);
        for _ in 0..10 {
            assert_eq!(day_status(Some(&log), &profile, &scoring), first);
        }
    }
}
