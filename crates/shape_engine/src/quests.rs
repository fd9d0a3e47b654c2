//! Quest generation and progress evaluation.
//!
//! Templates materialize lazily: one instance per (kind, expiry) for the
//! current day, ISO week and season. Expired instances are kept for history.
//! Each `QuestKind` carries its own progress predicate, so adding a kind
//! without a predicate fails to compile.

use crate::status;
use chrono::{DateTime, NaiveDate, Utc};
use shape_common::constants::{
    templates_for, QuestTemplate, ScoringConfig, FOCUS_REWARD_MULTIPLIER,
};
use shape_common::types::{
    CustomQuest, CustomTarget, DailyLog, DayStatus, FocusArea, Quest, QuestFrequency, QuestKind,
    UserProfile,
};
use shape_common::week;
use std::collections::BTreeMap;

fn kind_slug(kind: QuestKind) -> String {
    match kind {
        QuestKind::Custom(target) => format!("custom_{target:?}").to_lowercase(),
        other => {
            // Serde already owns the canonical snake_case names.
            serde_json::to_value(other)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("{other:?}").to_lowercase())
        }
    }
}

/// Expiry date for a template of the given frequency.
fn expiry_for(frequency: QuestFrequency, today: NaiveDate, profile: &UserProfile) -> NaiveDate {
    match frequency {
        QuestFrequency::Daily => today,
        QuestFrequency::Weekly => week::week_end(today),
        QuestFrequency::Season => profile.target_date,
    }
}

fn instantiate(
    template: &QuestTemplate,
    frequency: QuestFrequency,
    expires_at: NaiveDate,
    focus: FocusArea,
) -> Quest {
    // Matching focus boosts LP; "Balanced" boosts nothing.
    let boosted = focus != FocusArea::Balanced && template.focus == Some(focus);
    let reward_lp = if boosted {
        (template.reward_lp as f64 * FOCUS_REWARD_MULTIPLIER).floor() as i32
    } else {
        template.reward_lp
    };

    Quest {
        id: format!("{frequency:?}-{}-{expires_at}", kind_slug(template.kind)).to_lowercase(),
        title: template.title.to_string(),
        description: template.description.to_string(),
        frequency,
        reward_lp,
        reward_coins: template.reward_coins,
        completed_at: None,
        progress: 0,
        target: template.target,
        kind: template.kind,
        expires_at,
        is_custom: false,
        is_faith: template.is_faith,
    }
}

fn instantiate_custom(custom: &CustomQuest, today: NaiveDate) -> Quest {
    Quest {
        id: format!("custom-{}-{today}", custom.id),
        title: custom.title.clone(),
        description: format!("Custom goal: {} {:?}", custom.target_value, custom.target_type)
            .to_lowercase(),
        frequency: QuestFrequency::Daily,
        reward_lp: custom.reward_lp,
        reward_coins: custom.reward_coins,
        completed_at: None,
        progress: 0,
        target: custom.target_value,
        kind: QuestKind::Custom(custom.target_type),
        expires_at: today,
        is_custom: true,
        is_faith: false,
    }
}

/// Materialize any quest instances missing for the current period windows.
/// Faith templates are skipped unless the profile opts in.
pub fn generate(quests: &mut Vec<Quest>, profile: &UserProfile, today: NaiveDate) {
    for frequency in [
        QuestFrequency::Daily,
        QuestFrequency::Weekly,
        QuestFrequency::Season,
    ] {
        let expires_at = expiry_for(frequency, today, profile);
        for template in templates_for(frequency) {
            if template.is_faith && !profile.show_faith_quests {
                continue;
            }
            let exists = quests
                .iter()
                .any(|q| q.kind == template.kind && q.expires_at == expires_at && !q.is_custom);
            if !exists {
                quests.push(instantiate(
                    template,
                    frequency,
                    expires_at,
                    profile.current_focus,
                ));
            }
        }
    }

    for custom in &profile.custom_quests {
        let id = format!("custom-{}-{today}", custom.id);
        if !quests.iter().any(|q| q.id == id) {
            quests.push(instantiate_custom(custom, today));
        }
    }
}

/// Recompute progress for every open quest and mark completions.
/// Returns clones of the quests that completed during this pass; reward
/// crediting happens at the call site against the ledger and wallet.
pub fn evaluate(
    quests: &mut [Quest],
    logs: &BTreeMap<NaiveDate, DailyLog>,
    profile: &UserProfile,
    scoring: &ScoringConfig,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<Quest> {
    let mut newly_completed = Vec::new();

    for quest in quests.iter_mut() {
        // Completion is terminal.
        if quest.is_completed() {
            continue;
        }

        let progress = progress_for(quest, logs, profile, scoring, today);
        if progress >= quest.target {
            quest.progress = quest.target;
            quest.completed_at = Some(now);
            newly_completed.push(quest.clone());
        } else {
            quest.progress = progress;
        }
    }

    newly_completed
}

fn progress_for(
    quest: &Quest,
    logs: &BTreeMap<NaiveDate, DailyLog>,
    profile: &UserProfile,
    scoring: &ScoringConfig,
    today: NaiveDate,
) -> u32 {
    let today_log = logs.get(&today);
    let week_start = week::week_start(today);
    let weekly = || logs.values().filter(move |l| l.date >= week_start);

    match quest.kind {
        // Daily: binary against today's log.
        QuestKind::LogCalories => today_log.map_or(0, |l| u32::from(l.calories.is_some())),
        QuestKind::StayUnderCalories => today_log.map_or(0, |l| {
            u32::from(l.calories.map_or(false, |c| c <= profile.calorie_target))
        }),
        QuestKind::LogWeight => today_log.map_or(0, |l| u32::from(l.weight.is_some())),
        QuestKind::StepsEighty => today_log.map_or(0, |l| {
            let needed = (profile.target_steps as f64 * 0.8) as u32;
            u32::from(l.steps.map_or(false, |s| s >= needed))
        }),
        QuestKind::LogSleep => today_log.map_or(0, |l| u32::from(l.sleep_hours.is_some())),
        QuestKind::SleepTarget => today_log.map_or(0, |l| {
            u32::from(l.sleep_hours.map_or(false, |h| h >= profile.sleep_target_hours))
        }),

        // Faith quests have no automatic predicate; their progress is
        // untouched by evaluation.
        QuestKind::FaithPrayer | QuestKind::FaithReading => quest.progress,

        // Weekly: counts over the week-start..today window.
        QuestKind::WeeklyLogDays => weekly().filter(|l| l.calories.is_some()).count() as u32,
        QuestKind::WeeklyUnderDays => weekly()
            .filter(|l| l.calories.map_or(false, |c| c <= profile.calorie_target))
            .count() as u32,
        QuestKind::WeeklyStepDays => weekly()
            .filter(|l| l.steps.map_or(false, |s| s >= profile.target_steps))
            .count() as u32,
        QuestKind::WeeklyWeighDays => weekly().filter(|l| l.weight.is_some()).count() as u32,
        QuestKind::WeeklySleepLogDays => {
            weekly().filter(|l| l.sleep_hours.is_some()).count() as u32
        }

        // Season: the entire history.
        QuestKind::SeasonLogDays => logs.values().filter(|l| l.calories.is_some()).count() as u32,
        QuestKind::SeasonUnderDays => logs
            .values()
            .filter(|l| l.calories.map_or(false, |c| c <= profile.calorie_target))
            .count() as u32,
        QuestKind::SeasonStepTotal => logs
            .values()
            .fold(0u32, |acc, l| acc.saturating_add(l.steps.unwrap_or(0))),
        QuestKind::SeasonWeightLossPercent => {
            let current = today_log
                .and_then(|l| l.weight)
                .unwrap_or(profile.current_weight);
            let lost = (profile.start_weight - current) / profile.start_weight;
            u32::from(lost >= 0.03)
        }
        QuestKind::SeasonGreenDays => logs
            .values()
            .filter(|l| status::day_status(Some(l), profile, scoring) == DayStatus::Green)
            .count() as u32,

        // Player-authored dailies: binary against today's log.
        QuestKind::Custom(target) => {
            let Some(log) = today_log else { return 0 };
            let met = match target {
                CustomTarget::Calories => {
                    log.calories.map_or(false, |c| c <= quest.target)
                }
                CustomTarget::Steps => log.steps.map_or(false, |s| s >= quest.target),
                CustomTarget::Weight => {
                    log.weight.map_or(false, |w| w <= quest.target as f64)
                }
                CustomTarget::Sleep => {
                    log.sleep_hours.map_or(false, |h| h >= quest.target as f64)
                }
                CustomTarget::Reflection => {
                    log.reflection.as_deref().map_or(false, |r| !r.is_empty())
                }
            };
            if met {
                quest.target
            } else {
                0
            }
        }
    }
}
