//! Derived views over the snapshot: readiness, consistency, insights,
//! personal records, the merged timeline and same-day pings.
//!
//! Nothing here mutates state. Every value is recomputed from history on
//! demand and never persisted.

use crate::scoring;
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use shape_common::constants::PROMOTION_MODE_LP;
use shape_common::state::GameState;
use shape_common::types::{
    ActivityKind, DailyLog, Insight, InsightKind, LifeEventTag, MatchResult, PersonalRecords,
    Ping, PingKind, Readiness, TimelineEvent, TimelineKind,
};
use std::collections::BTreeMap;

/// Logs the consistency score and insights look back over.
const TRAILING_LOGS: usize = 30;

/// Everything the dashboard needs that is not raw state.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub readiness: Readiness,
    /// Weighted blend of calorie hits, weigh-ins and sleep hits over the
    /// trailing logs, 0-100.
    pub consistency_score: u32,
    pub insights: Vec<Insight>,
    pub records: PersonalRecords,
    pub timeline: Vec<TimelineEvent>,
    pub is_promotion_mode: bool,
}

/// Compute the full derived view for `today`.
pub fn derive(state: &GameState, today: NaiveDate) -> Derived {
    let promotion = state
        .profile
        .as_ref()
        .map_or(false, |p| scoring::is_promotion_mode(p, state.rank.lp));

    Derived {
        readiness: readiness(state, today),
        consistency_score: consistency_score(state),
        insights: insights(state),
        records: records(state),
        timeline: timeline(state),
        is_promotion_mode: promotion,
    }
}

/// The newest `n` logs, most recent first.
fn trailing_logs(state: &GameState, n: usize) -> Vec<&DailyLog> {
    state.logs.values().rev().take(n).collect()
}

/// Readiness for today, read off yesterday's log: one point each for
/// hitting the sleep, calorie and step targets. 0-1 is Low, 2 Fair,
/// 3 Ready. A missing yesterday scores zero.
pub fn readiness(state: &GameState, today: NaiveDate) -> Readiness {
    let Some(profile) = state.profile.as_ref() else {
        return Readiness::Fair;
    };
    if state.logs.is_empty() {
        return Readiness::Fair;
    }

    let yesterday = today - Duration::days(1);
    let mut score = 0;
    if let Some(log) = state.logs.get(&yesterday) {
        if log.sleep_hours.unwrap_or(0.0) >= profile.sleep_target_hours {
            score += 1;
        }
        if log.calories.map_or(false, |c| c <= profile.calorie_target) {
            score += 1;
        }
        if log.steps.unwrap_or(0) >= profile.target_steps {
            score += 1;
        }
    }

    match score {
        0 | 1 => Readiness::Low,
        2 => Readiness::Fair,
        _ => Readiness::Ready,
    }
}

/// `round((calorieHits*0.4 + weighIns*0.3 + sleepHits*0.3) / dayCount * 100)`
/// over the trailing logs.
pub fn consistency_score(state: &GameState) -> u32 {
    let Some(profile) = state.profile.as_ref() else {
        return 0;
    };
    let window = trailing_logs(state, TRAILING_LOGS);
    if window.is_empty() {
        return 0;
    }

    let calorie_hits = window
        .iter()
        .filter(|l| l.calories.map_or(false, |c| c <= profile.calorie_target))
        .count() as f64;
    let sleep_hits = window
        .iter()
        .filter(|l| l.sleep_hours.unwrap_or(0.0) >= profile.sleep_target_hours)
        .count() as f64;
    let weigh_ins = window.iter().filter(|l| l.weight.is_some()).count() as f64;

    let blend = calorie_hits * 0.4 + weigh_ins * 0.3 + sleep_hits * 0.3;
    (blend / window.len() as f64 * 100.0).round() as u32
}

/// Threshold-triggered flags over the same trailing window the consistency
/// score uses. An empty history produces no insights at all.
pub fn insights(state: &GameState) -> Vec<Insight> {
    if state.profile.is_none() || state.logs.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let score = consistency_score(state);
    if score > 80 {
        out.push(Insight {
            kind: InsightKind::Strength,
            text: "Excellent consistency rating.".to_string(),
        });
    }
    if score < 40 {
        out.push(Insight {
            kind: InsightKind::Weakness,
            text: "Consistency is dropping.".to_string(),
        });
    }

    let window = trailing_logs(state, TRAILING_LOGS);
    let low_sleep = window
        .iter()
        .filter(|l| l.sleep_hours.unwrap_or(0.0) < 6.0)
        .count();
    if low_sleep > 5 {
        out.push(Insight {
            kind: InsightKind::Weakness,
            text: "Sleep deprivation detected.".to_string(),
        });
    }

    let tagged = window
        .iter()
        .filter(|l| l.life_event_tag.map_or(false, |t| t != LifeEventTag::None))
        .count();
    if tagged >= 3 {
        out.push(Insight {
            kind: InsightKind::Neutral,
            text: format!(
                "Life events tagged on {tagged} recent days. Adjust expectations, not effort."
            ),
        });
    }

    out
}

/// Best-ever marks, single pass over history.
pub fn records(state: &GameState) -> PersonalRecords {
    let mut records = PersonalRecords::default();
    let mut streak = 0u32;
    let mut quests_by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();

    for log in state.logs.values() {
        // Any non-Victory day, Draws included, breaks the running streak.
        if log.match_result == Some(MatchResult::Victory) {
            streak += 1;
            records.longest_streak = records.longest_streak.max(streak);
        } else {
            streak = 0;
        }
        if let Some(lp) = log.lp_change {
            records.highest_daily_lp = records.highest_daily_lp.max(lp);
        }
        if let Some(w) = log.weight {
            if records.lowest_weight == 0.0 || w < records.lowest_weight {
                records.lowest_weight = w;
            }
        }
        if let Some(s) = log.steps {
            records.most_steps = records.most_steps.max(s);
        }
        if let Some(h) = log.sleep_hours {
            if h > records.best_sleep {
                records.best_sleep = h;
            }
        }
    }

    for quest in &state.quests {
        if let Some(done) = quest.completed_at {
            *quests_by_day.entry(done.date_naive()).or_default() += 1;
        }
    }
    records.most_quests = quests_by_day.values().copied().max().unwrap_or(0);

    records
}

/// Merge rank movements, badge unlocks and archived splits into one
/// reverse-chronological feed.
pub fn timeline(state: &GameState) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    for entry in &state.activity {
        let kind = match entry.kind {
            ActivityKind::RankUp | ActivityKind::RankDown | ActivityKind::Promotion => {
                TimelineKind::Rank
            }
            ActivityKind::RecordBroken => TimelineKind::Record,
            _ => continue,
        };
        events.push(TimelineEvent {
            id: entry.id.clone(),
            date: entry.date,
            title: entry.message.clone(),
            description: entry.value.clone().unwrap_or_default(),
            kind,
        });
    }

    for badge in &state.badges {
        if let Some(when) = badge.unlocked_at {
            events.push(TimelineEvent {
                id: format!("badge-{}", badge.id),
                date: when.date_naive(),
                title: format!("Unlocked {}", badge.name),
                description: badge.description.clone(),
                kind: TimelineKind::Milestone,
            });
        }
    }

    for split in &state.split.history {
        events.push(TimelineEvent {
            id: format!("split-{}", split.end_date.timestamp()),
            date: split.end_date.date_naive(),
            title: format!("{} concluded", split.name),
            description: format!("Finished {} with {} total LP", split.final_rank, split.final_lp),
            kind: TimelineKind::Split,
        });
    }

    events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    events
}

/// Same-day nudges. Dismissal is the caller's concern.
pub fn pings(state: &GameState, now: DateTime<Utc>) -> Vec<Ping> {
    if state.profile.is_none() {
        return Vec::new();
    }
    let today = now.date_naive();
    let calories_logged = state
        .logs
        .get(&today)
        .map_or(false, |l| l.calories.is_some());

    let mut out = Vec::new();

    if now.hour() >= 18 && !calories_logged {
        out.push(Ping {
            id: "evening-log".to_string(),
            message: "Evening check: no calories logged yet today.".to_string(),
            kind: PingKind::Warning,
        });
    }

    // The nudge fires on LP alone; the profile toggle only gates whether
    // the doubled delta actually applies.
    if state.rank.lp >= PROMOTION_MODE_LP {
        out.push(Ping {
            id: "promotion-armed".to_string(),
            message: format!(
                "Promotion mode armed at {} LP. A strong day counts double.",
                state.rank.lp
            ),
            kind: PingKind::Info,
        });
    }

    if state.rank.streak > 3 && !calories_logged {
        out.push(Ping {
            id: "streak-risk".to_string(),
            message: format!(
                "Your {}-day streak is on the line. Log today to keep it.",
                state.rank.streak
            ),
            kind: PingKind::Warning,
        });
    }

    out
}
