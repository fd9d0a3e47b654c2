//! Fixed game tables: scoring constants, mastery XP, the badge catalog,
//! quest templates, coach text and the theme shop.
//!
//! Values are game balance, not configuration a user edits. The scoring
//! table is still exposed as a struct so tests and future tuning can
//! override individual knobs.

use crate::types::{CustomTarget, FocusArea, QuestFrequency, QuestKind};
use serde::{Deserialize, Serialize};

/// All scoring knobs in one place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Flat slack around the expected-weight trend line, in kg.
    pub weight_tolerance_kg: f64,
    /// Extra weight slack earned by hitting the sleep target (day-status
    /// classification only; match scoring deliberately ignores it).
    pub sleep_forgiveness_kg: f64,
    pub lp_win_perfect: i32,
    pub lp_win_good: i32,
    pub lp_win_ok: i32,
    pub lp_loss_bad: i32,
    pub lp_loss_severe: i32,
    pub lp_loss_critical: i32,
    pub lp_streak_bonus_base: i32,
    pub lp_streak_bonus_inc: i32,
    pub lp_streak_cap: i32,
    pub missing_weight_penalty_cap: i32,
    /// LP delta multiplier while promotion mode is armed (lp >= 90).
    pub promotion_multiplier: i32,
    pub focus_change_cost: u32,
    /// Coin price of one grace day.
    pub grace_cost: u32,
    /// Grace days allowed per ISO week.
    pub grace_limit_weekly: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_tolerance_kg: 0.4,
            sleep_forgiveness_kg: 0.2,
            lp_win_perfect: 12,
            lp_win_good: 4,
            lp_win_ok: 2,
            lp_loss_bad: -5,
            lp_loss_severe: -8,
            lp_loss_critical: -10,
            lp_streak_bonus_base: 10,
            lp_streak_bonus_inc: 2,
            lp_streak_cap: 10,
            missing_weight_penalty_cap: 2,
            promotion_multiplier: 2,
            focus_change_cost: 5,
            grace_cost: 10,
            grace_limit_weekly: 1,
        }
    }
}

/// LP threshold at which promotion mode arms.
pub const PROMOTION_MODE_LP: i32 = 90;

/// Cumulative XP needed to enter each mastery level (level = index + 1).
pub const MASTERY_THRESHOLDS: &[u32] = &[0, 100, 300, 600, 1000, 1500, 2200, 3000, 4000, 5500];

/// Mastery XP amounts per logging action.
pub mod mastery_xp {
    pub const LOG_CALORIES: u32 = 10;
    pub const UNDER_TARGET: u32 = 5;
    pub const LOG_SLEEP: u32 = 8;
    pub const HIT_SLEEP: u32 = 5;
    pub const LOG_STEPS: u32 = 5;
    pub const HIT_STEPS: u32 = 5;
    /// Weight awards logging XP only; there is no hit-target bonus.
    pub const LOG_WEIGHT: u32 = 6;
    pub const REFLECTION: u32 = 6;
}

/// Static badge definition. Progress/unlock state lives on [`crate::types::Badge`].
#[derive(Debug, Clone, Copy)]
pub struct BadgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub target: u32,
}

/// The full achievement catalog.
pub const BADGE_CATALOG: &[BadgeDef] = &[
    BadgeDef { id: "consistency", name: "Consistency", description: "Log calories 7 days in a row", icon: "🔥", target: 7 },
    BadgeDef { id: "early_riser", name: "Early Riser", description: "First log before 9:00 AM (5 days)", icon: "🌅", target: 5 },
    BadgeDef { id: "comeback", name: "Comeback", description: "3 Green days after 2 Red days", icon: "🛡️", target: 1 },
    BadgeDef { id: "steady_hands", name: "Steady Hands", description: "No red days for 14 days", icon: "⚖️", target: 14 },
    BadgeDef { id: "sleeper", name: "Sleeper", description: "Hit sleep target 7 nights", icon: "🌙", target: 7 },
    BadgeDef { id: "weight_track", name: "On Track", description: "10 days with weight on trend", icon: "📉", target: 10 },
    BadgeDef { id: "pathfinder", name: "Pathfinder", description: "Hit step target 10 days", icon: "👣", target: 10 },
    BadgeDef { id: "scribe", name: "Scribe", description: "Write 10 daily reflections", icon: "📜", target: 10 },
    BadgeDef { id: "collector", name: "Collector", description: "Complete 25 quests", icon: "💎", target: 25 },
    BadgeDef { id: "iron_will", name: "Iron Will", description: "Reach Bronze Tier", icon: "🥉", target: 1 },
    BadgeDef { id: "climber", name: "Climber", description: "Promote 5 times", icon: "🚀", target: 5 },
    BadgeDef { id: "finisher", name: "Season Finisher", description: "Reach 1000 Total LP", icon: "🏁", target: 1000 },
];

/// Static quest template. Instances are materialized per period window.
#[derive(Debug, Clone, Copy)]
pub struct QuestTemplate {
    pub kind: QuestKind,
    pub title: &'static str,
    pub description: &'static str,
    pub reward_lp: i32,
    pub reward_coins: u32,
    pub target: u32,
    pub is_faith: bool,
    pub focus: Option<FocusArea>,
}

pub const DAILY_QUESTS: &[QuestTemplate] = &[
    QuestTemplate { kind: QuestKind::LogCalories, title: "Log Calories", description: "Track your intake today", reward_lp: 8, reward_coins: 1, target: 1, is_faith: false, focus: Some(FocusArea::CutCalories) },
    QuestTemplate { kind: QuestKind::StayUnderCalories, title: "Calorie Control", description: "Stay under calorie target today", reward_lp: 6, reward_coins: 0, target: 1, is_faith: false, focus: Some(FocusArea::CutCalories) },
    QuestTemplate { kind: QuestKind::LogWeight, title: "Weigh In", description: "Log your weight today", reward_lp: 4, reward_coins: 0, target: 1, is_faith: false, focus: None },
    QuestTemplate { kind: QuestKind::StepsEighty, title: "On the Move", description: "Hit 80% of step target", reward_lp: 3, reward_coins: 0, target: 1, is_faith: false, focus: Some(FocusArea::MoveMore) },
    QuestTemplate { kind: QuestKind::LogSleep, title: "Rest & Recover", description: "Log your sleep hours", reward_lp: 4, reward_coins: 1, target: 1, is_faith: false, focus: Some(FocusArea::ImproveSleep) },
    QuestTemplate { kind: QuestKind::SleepTarget, title: "Well Rested", description: "Sleep at least target hours", reward_lp: 4, reward_coins: 0, target: 1, is_faith: false, focus: Some(FocusArea::ImproveSleep) },
    QuestTemplate { kind: QuestKind::FaithPrayer, title: "Morning Prayer", description: "Start the day with prayer", reward_lp: 0, reward_coins: 5, target: 1, is_faith: true, focus: None },
    QuestTemplate { kind: QuestKind::FaithReading, title: "Daily Reading", description: "Read one chapter or verse", reward_lp: 0, reward_coins: 5, target: 1, is_faith: true, focus: None },
];

pub const WEEKLY_QUESTS: &[QuestTemplate] = &[
    QuestTemplate { kind: QuestKind::WeeklyLogDays, title: "Consistency is Key", description: "Log calories 6 days this week", reward_lp: 20, reward_coins: 5, target: 6, is_faith: false, focus: Some(FocusArea::Consistency) },
    QuestTemplate { kind: QuestKind::WeeklyUnderDays, title: "Diet Discipline", description: "Under calorie target 4 days", reward_lp: 16, reward_coins: 3, target: 4, is_faith: false, focus: Some(FocusArea::CutCalories) },
    QuestTemplate { kind: QuestKind::WeeklyStepDays, title: "Pathfinder", description: "Hit step target 4 days", reward_lp: 10, reward_coins: 2, target: 4, is_faith: false, focus: Some(FocusArea::MoveMore) },
    QuestTemplate { kind: QuestKind::WeeklyWeighDays, title: "Data Collector", description: "Log weight 3 days", reward_lp: 10, reward_coins: 1, target: 3, is_faith: false, focus: None },
    QuestTemplate { kind: QuestKind::WeeklySleepLogDays, title: "Sleep Tracking", description: "Log sleep 5 days this week", reward_lp: 12, reward_coins: 2, target: 5, is_faith: false, focus: Some(FocusArea::ImproveSleep) },
];

pub const SEASON_QUESTS: &[QuestTemplate] = &[
    QuestTemplate { kind: QuestKind::SeasonLogDays, title: "Dedicated", description: "Log calories 30 days", reward_lp: 50, reward_coins: 20, target: 30, is_faith: false, focus: Some(FocusArea::Consistency) },
    QuestTemplate { kind: QuestKind::SeasonWeightLossPercent, title: "Transformation", description: "Lose 3% of start weight", reward_lp: 40, reward_coins: 15, target: 1, is_faith: false, focus: None },
    QuestTemplate { kind: QuestKind::SeasonStepTotal, title: "Marathoner", description: "Walk 150k steps total", reward_lp: 25, reward_coins: 10, target: 150_000, is_faith: false, focus: Some(FocusArea::MoveMore) },
    QuestTemplate { kind: QuestKind::SeasonUnderDays, title: "Disciplined", description: "Under target 20 days", reward_lp: 35, reward_coins: 10, target: 20, is_faith: false, focus: Some(FocusArea::CutCalories) },
    QuestTemplate { kind: QuestKind::SeasonGreenDays, title: "Perfect Streak", description: "10 Perfect (Green) days", reward_lp: 30, reward_coins: 10, target: 10, is_faith: false, focus: None },
];

pub fn templates_for(frequency: QuestFrequency) -> &'static [QuestTemplate] {
    match frequency {
        QuestFrequency::Daily => DAILY_QUESTS,
        QuestFrequency::Weekly => WEEKLY_QUESTS,
        QuestFrequency::Season => SEASON_QUESTS,
    }
}

/// Reward-LP multiplier applied when a template's focus matches the profile's.
pub const FOCUS_REWARD_MULTIPLIER: f64 = 1.5;

/// Coach line templates, keyed by a rough classification of the day.
pub mod coach {
    pub const PERFECT: &[&str] = &[
        "Excellent execution today; maintain this momentum.",
        "Precision discipline. You are on the path.",
        "Flawless logging and limits. Keep focused.",
    ];
    pub const GOOD_DIET: &[&str] = &[
        "Nutrition on point. Keep the discipline.",
        "Good control on intake. Stay the course.",
        "Fueling managed well today.",
    ];
    pub const WEIGHT_SLIP: &[&str] = &[
        "Scale shifted, but habits determine the long game.",
        "Weight drifted. Stay consistent with intake tomorrow.",
        "Fluctuation is normal. Focus on the plan.",
    ];
    pub const SLEEP_LOW: &[&str] = &[
        "Rest is recovery. Prioritize sleep tonight.",
        "Low energy detected. Aim for an earlier bedtime.",
        "Sleep debt accumulates. Recover your rhythm.",
    ];
    pub const MISSING_LOGS: &[&str] = &[
        "Data is power. Complete your logs to clear the fog.",
        "Consistency requires tracking. Log your meals.",
        "Do not let the day slip without a record.",
    ];

    pub const FRESH_DAY: &str = "The day is fresh. Make your first move.";
    pub const TARGET_MISSED: &str = "Target missed. Recover with a clean slate tomorrow.";
    pub const DEFAULT: &str = "Keep pushing. Every log counts.";
}

pub const LOADING_TIPS: &[&str] = &[
    "Consistency beats intensity every time.",
    "You don't have to be perfect, just persistent.",
    "Sleep is when your body rebuilds itself.",
    "Logging food builds awareness, not guilt.",
    "A bad day is just data. Learn and reset.",
    "Small steps daily lead to massive distances yearly.",
    "Hydration improves cognitive function and energy.",
    "Protein helps preserve muscle during weight loss.",
    "Walking is the most underrated fat burner.",
    "Discipline is choosing what you want most over what you want now.",
];

pub const WHY_TEMPLATES: &[&str] = &[
    "Your discipline today shapes your freedom tomorrow.",
    "Small choices done daily build strong lives.",
    "Steward your body with purpose.",
    "Consistency beats intensity.",
    "You are building a vessel for your mission.",
    "Comfort is the enemy of progress.",
    "Today's pain is tomorrow's power.",
];

/// Scripture quote with reference, shown only when the profile opts in.
#[derive(Debug, Clone, Copy)]
pub struct FaithQuote {
    pub text: &'static str,
    pub reference: &'static str,
}

pub const FAITH_QUOTES: &[FaithQuote] = &[
    FaithQuote { text: "Whatever you do, do it all for the glory of God.", reference: "1 Corinthians 10:31" },
    FaithQuote { text: "Let us not grow weary in doing good.", reference: "Galatians 6:9" },
    FaithQuote { text: "The Lord is my strength and my shield.", reference: "Psalm 28:7" },
    FaithQuote { text: "Run with endurance the race set before you.", reference: "Hebrews 12:1" },
    FaithQuote { text: "Commit your work to the Lord.", reference: "Proverbs 16:3" },
    FaithQuote { text: "I can do all things through Christ who strengthens me.", reference: "Philippians 4:13" },
    FaithQuote { text: "Be strong and courageous.", reference: "Joshua 1:9" },
    FaithQuote { text: "For the Spirit God gave us does not make us timid, but gives us power, love and self-discipline.", reference: "2 Timothy 1:7" },
];

/// Purchasable cosmetic theme. Colors are a presentation concern; the engine
/// only cares about id and cost.
#[derive(Debug, Clone, Copy)]
pub struct ThemeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u32,
}

pub const THEMES: &[ThemeDef] = &[
    ThemeDef { id: "default", name: "Dark Gold", cost: 0 },
    ThemeDef { id: "silver", name: "Silver Frost", cost: 50 },
    ThemeDef { id: "emerald", name: "Emerald Night", cost: 75 },
    ThemeDef { id: "crimson", name: "Crimson Dawn", cost: 100 },
];

pub fn theme_by_id(id: &str) -> Option<&'static ThemeDef> {
    THEMES.iter().find(|t| t.id == id)
}
