//! Rank ledger: LP application, streaks and tier/division transitions.
//!
//! LP lives in a 0-99 band per division. Crossing 100 promotes one division
//! step up the ladder carrying the remainder; dropping below 0 demotes one
//! step, entering the lower division at 100 + lp. Iron IV is the floor: LP
//! clamps at 0 there. Master and above carry no division and step
//! tier-to-tier.

use chrono::{DateTime, NaiveDate, Utc};
use shape_common::types::{Division, MatchResult, RankHistoryEntry, RankState, Tier};
use tracing::info;

/// What happened while applying a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// Rank labels entered by promotion, in order.
    pub promotions: Vec<String>,
    /// Rank labels entered by demotion, in order.
    pub demotions: Vec<String>,
}

/// Apply an LP delta: ledger counters, a prepended history line, and any
/// boundary crossings.
pub fn apply_delta(
    rank: &mut RankState,
    delta: i32,
    date: NaiveDate,
    reason: &str,
    now: DateTime<Utc>,
) -> LedgerOutcome {
    rank.lp += delta;
    rank.total_lp += delta as i64;
    rank.last_updated = now;
    rank.history.insert(
        0,
        RankHistoryEntry {
            date,
            lp_change: delta,
            reason: reason.to_string(),
            timestamp: now,
        },
    );

    let mut outcome = LedgerOutcome::default();

    while rank.lp >= 100 {
        if !promote(rank) {
            // Top of the ladder: LP simply accumulates.
            break;
        }
        rank.lp -= 100;
        info!(rank = %rank.label(), lp = rank.lp, "promoted");
        outcome.promotions.push(rank.label());
    }

    while rank.lp < 0 {
        if !demote(rank) {
            // Iron IV floor.
            rank.lp = 0;
            break;
        }
        rank.lp += 100;
        info!(rank = %rank.label(), lp = rank.lp, "demoted");
        outcome.demotions.push(rank.label());
    }

    outcome
}

/// Victory extends the streak, Defeat breaks it, Draw leaves it alone.
pub fn update_streak(rank: &mut RankState, result: MatchResult) {
    match result {
        MatchResult::Victory => rank.streak += 1,
        MatchResult::Defeat => rank.streak = 0,
        MatchResult::Draw => {}
    }
}

/// One step up the ladder. False at Challenger.
fn promote(rank: &mut RankState) -> bool {
    match rank.division {
        Some(division) => match division.next() {
            Some(next) => {
                rank.division = Some(next);
                true
            }
            None => advance_tier(rank),
        },
        None => advance_tier(rank),
    }
}

fn advance_tier(rank: &mut RankState) -> bool {
    let Some(next) = rank.tier.next() else {
        return false;
    };
    rank.tier = next;
    rank.division = next.has_divisions().then_some(Division::IV);
    true
}

/// One step down the ladder. False at Iron IV.
fn demote(rank: &mut RankState) -> bool {
    match rank.division {
        Some(division) => match division.prev() {
            Some(prev) => {
                rank.division = Some(prev);
                true
            }
            None => retreat_tier(rank),
        },
        None => retreat_tier(rank),
    }
}

fn retreat_tier(rank: &mut RankState) -> bool {
    let Some(prev) = rank.tier.prev() else {
        return false;
    };
    rank.tier = prev;
    rank.division = prev.has_divisions().then_some(Division::I);
    true
}
