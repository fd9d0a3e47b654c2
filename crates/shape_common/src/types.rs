//! Core data model for Summoner's Shape.
//!
//! Everything here is persisted as part of the game snapshot, except the
//! derived-view types at the bottom (records, timeline, insights, pings)
//! which are recomputed from history and never stored.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Biological sex, used only for BMR calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// Ladder tiers in ascending order. Ordering derives from declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Full ladder, ascending.
    pub const ORDER: [Tier; 10] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    pub fn index(&self) -> usize {
        Self::ORDER.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Iron through Diamond carry divisions IV..I; Master and above do not.
    pub fn has_divisions(&self) -> bool {
        *self < Tier::Master
    }

    pub fn next(&self) -> Option<Tier> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Tier> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Iron => "Iron",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Emerald => "Emerald",
            Tier::Diamond => "Diamond",
            Tier::Master => "Master",
            Tier::Grandmaster => "Grandmaster",
            Tier::Challenger => "Challenger",
        };
        write!(f, "{name}")
    }
}

/// Divisions within a tier, ascending (IV is the bottom of a tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Division {
    IV,
    III,
    II,
    I,
}

impl Division {
    /// Ascending within a tier.
    pub const ORDER: [Division; 4] = [Division::IV, Division::III, Division::II, Division::I];

    pub fn index(&self) -> usize {
        Self::ORDER.iter().position(|d| d == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<Division> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Division> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Division::IV => "IV",
            Division::III => "III",
            Division::II => "II",
            Division::I => "I",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one calendar day scored as a ranked match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Victory,
    Defeat,
    Draw,
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchResult::Victory => "Victory",
            MatchResult::Defeat => "Defeat",
            MatchResult::Draw => "Draw",
        };
        write!(f, "{name}")
    }
}

/// Qualitative classification of a day's logs against targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Green,
    Yellow,
    Red,
    Gray,
}

/// Player-selected emphasis area. Quests whose declared focus matches get a
/// reward boost; `Balanced` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    Balanced,
    #[serde(rename = "Cut Calories")]
    CutCalories,
    #[serde(rename = "Improve Sleep")]
    ImproveSleep,
    #[serde(rename = "Move More")]
    MoveMore,
    Consistency,
}

impl std::fmt::Display for FocusArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FocusArea::Balanced => "Balanced",
            FocusArea::CutCalories => "Cut Calories",
            FocusArea::ImproveSleep => "Improve Sleep",
            FocusArea::MoveMore => "Move More",
            FocusArea::Consistency => "Consistency",
        };
        write!(f, "{name}")
    }
}

/// Optional context tag a player can attach to a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeEventTag {
    None,
    Travel,
    Sick,
    Stress,
    Celebration,
    Work,
}

/// Visual tint preference (presentation-layer setting carried in the profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TintOverride {
    Auto,
    Morning,
    Evening,
}

/// Metric a player-authored quest is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomTarget {
    Calories,
    Steps,
    Weight,
    Sleep,
    Reflection,
}

/// A player-authored daily quest definition. Instantiated once per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuest {
    pub id: String,
    pub title: String,
    pub target_type: CustomTarget,
    pub target_value: u32,
    pub reward_lp: i32,
    pub reward_coins: u32,
}

/// Per-category mastery XP. Counters only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MasteryState {
    pub calories: u32,
    pub sleep: u32,
    pub steps: u32,
    pub weight: u32,
    pub reflection: u32,
}

/// Achievement with mutable progress and a terminal unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: u32,
    pub target: u32,
}

/// Archived record of a finished split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitHistoryEntry {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub final_lp: i64,
    pub final_rank: String,
    pub badges_earned: u32,
}

/// The active "season" window. Prior splits accumulate in `history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitState {
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<SplitHistoryEntry>,
}

impl SplitState {
    /// Splits run eight weeks by default.
    pub const DEFAULT_LENGTH_WEEKS: i64 = 8;

    pub fn starting(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("split-{}", now.timestamp_millis()),
            name: name.to_string(),
            start_date: now,
            end_date: now + chrono::Duration::weeks(Self::DEFAULT_LENGTH_WEEKS),
            history: Vec::new(),
        }
    }
}

impl Default for SplitState {
    fn default() -> Self {
        Self::starting("Season of Discipline", Utc::now())
    }
}

/// Member of an (unused, local-only) group roster. Kept for snapshot shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub name: String,
    pub calories_logged: u32,
    pub steps: u32,
    pub sleep_logged: u32,
    pub contribution_points: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupState {
    pub name: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

/// One free-text commitment per ISO week, cleared on rollover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub week_id: String,
    pub focus: FocusArea,
    pub promise: String,
    pub created_at: DateTime<Utc>,
}

/// Weekly grace-day budget. Resets when the ISO week id changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraceState {
    pub count: u32,
    pub week_id: String,
}

/// The player's configuration: identity, body metrics, targets, currency and
/// feature flags. Created once at onboarding, mutated by settings and spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    /// Height in cm.
    pub height: f64,
    pub start_weight: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub target_date: NaiveDate,
    pub target_steps: u32,
    pub calorie_target: u32,
    pub sleep_target_hours: f64,
    pub created_at: NaiveDate,
    /// Basal metabolic rate (Mifflin-St Jeor), computed at onboarding.
    pub bmr: f64,
    #[serde(default)]
    pub coins: u32,

    // Settings / feature flags
    #[serde(default)]
    pub show_faith_quotes: bool,
    #[serde(default)]
    pub show_faith_quests: bool,
    #[serde(default)]
    pub promotion_mode_enabled: bool,
    pub season_theme: String,
    pub sound_enabled: bool,
    #[serde(default)]
    pub reset_rank_on_split: bool,
    pub auto_tint: bool,
    pub tint_override: TintOverride,

    // Customization
    pub current_focus: FocusArea,
    pub current_theme_id: String,
    pub unlocked_theme_ids: Vec<String>,

    #[serde(default)]
    pub custom_quests: Vec<CustomQuest>,
}

impl UserProfile {
    /// True when the player is trying to lose weight.
    pub fn is_loss_goal(&self) -> bool {
        self.target_weight < self.start_weight
    }
}

/// One entry per calendar date. Raw metrics come from the player; the
/// computed fields are written only by the scoring engine and grace manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    /// Subjective 1-5.
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reflection: Option<String>,
    #[serde(default)]
    pub first_calorie_time: Option<NaiveTime>,
    #[serde(default)]
    pub last_calorie_time: Option<NaiveTime>,
    #[serde(default)]
    pub life_event_tag: Option<LifeEventTag>,

    // Computed by the engine
    #[serde(default)]
    pub match_result: Option<MatchResult>,
    #[serde(default)]
    pub lp_change: Option<i32>,
    #[serde(default)]
    pub recap_shown: bool,
    #[serde(default)]
    pub grace_used: bool,
    #[serde(default)]
    pub coach_line: Option<String>,
}

impl DailyLog {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            weight: None,
            calories: None,
            steps: None,
            sleep_hours: None,
            sleep_quality: None,
            notes: None,
            reflection: None,
            first_calorie_time: None,
            last_calorie_time: None,
            life_event_tag: None,
            match_result: None,
            lp_change: None,
            recap_shown: false,
            grace_used: false,
            coach_line: None,
        }
    }

    /// True once any scoreable metric is present.
    pub fn has_metrics(&self) -> bool {
        self.calories.is_some()
            || self.weight.is_some()
            || self.steps.is_some()
            || self.sleep_hours.is_some()
    }
}

/// A partial submission for one date. Present fields overlay the stored log;
/// absent fields leave it untouched (logs are merged, never replaced).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSubmission {
    pub date: NaiveDate,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reflection: Option<String>,
    #[serde(default)]
    pub life_event_tag: Option<LifeEventTag>,
}

impl LogSubmission {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    /// Whether this submission carries a value that scores a match.
    /// Steps/sleep-only updates never move LP.
    pub fn scores_match(&self) -> bool {
        self.calories.is_some() || self.weight.is_some()
    }
}

/// Kinds of events in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Log,
    RankUp,
    RankDown,
    QuestComplete,
    Insight,
    Promotion,
    BadgeUnlock,
    RecordBroken,
    GraceUsed,
}

/// Append-only feed of notable events, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// One ledger line in the rank history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankHistoryEntry {
    pub date: NaiveDate,
    pub lp_change: i32,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Singleton rank ledger. Mutated only by the scoring path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankState {
    pub tier: Tier,
    /// `None` for Master and above.
    pub division: Option<Division>,
    /// 0-99 within the current division; promotion handling runs at >= 100.
    pub lp: i32,
    /// Lifetime LP counter.
    pub total_lp: i64,
    pub streak: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<RankHistoryEntry>,
}

impl RankState {
    /// Formatted rank label, e.g. "Gold II" or "Master".
    pub fn label(&self) -> String {
        match self.division {
            Some(d) => format!("{} {}", self.tier, d),
            None => self.tier.to_string(),
        }
    }
}

impl Default for RankState {
    fn default() -> Self {
        Self {
            tier: Tier::Iron,
            division: Some(Division::IV),
            lp: 0,
            total_lp: 0,
            streak: 0,
            last_updated: Utc::now(),
            history: Vec::new(),
        }
    }
}

/// How often a quest template re-instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestFrequency {
    Daily,
    Weekly,
    Season,
}

/// Closed set of quest behaviors. Each kind carries its own progress
/// predicate in the engine, so dispatch is exhaustive at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    // Daily
    LogCalories,
    StayUnderCalories,
    LogWeight,
    StepsEighty,
    LogSleep,
    SleepTarget,
    FaithPrayer,
    FaithReading,
    // Weekly
    WeeklyLogDays,
    WeeklyUnderDays,
    WeeklyStepDays,
    WeeklyWeighDays,
    WeeklySleepLogDays,
    // Season
    SeasonLogDays,
    SeasonWeightLossPercent,
    SeasonStepTotal,
    SeasonUnderDays,
    SeasonGreenDays,
    // Player-authored
    Custom(CustomTarget),
}

/// A materialized quest instance for one period window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub frequency: QuestFrequency,
    pub reward_lp: i32,
    pub reward_coins: u32,
    /// Terminal: once set the quest is never re-evaluated.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: u32,
    pub target: u32,
    pub kind: QuestKind,
    pub expires_at: NaiveDate,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub is_faith: bool,
}

impl Quest {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Derived views (never persisted)
// ---------------------------------------------------------------------------

/// Readiness for today, derived from yesterday's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    Low,
    Fair,
    Ready,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Readiness::Low => "Low",
            Readiness::Fair => "Fair",
            Readiness::Ready => "Ready",
        };
        write!(f, "{name}")
    }
}

/// Best-ever marks, recomputed from the full log history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalRecords {
    pub longest_streak: u32,
    pub highest_daily_lp: i32,
    pub lowest_weight: f64,
    pub most_steps: u32,
    pub best_sleep: f64,
    pub most_quests: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Strength,
    Weakness,
    Neutral,
}

/// Threshold-triggered textual flag over recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Milestone,
    Rank,
    Record,
    Split,
}

/// One row in the merged reverse-chronological timeline feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub kind: TimelineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingKind {
    Warning,
    Info,
    Success,
}

/// Contextual same-day nudge. Dismissal is session-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub id: String,
    pub message: String,
    pub kind: PingKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order_walks_the_full_ladder() {
        let mut tier = Tier::Iron;
        let mut seen = vec![tier];
        while let Some(next) = tier.next() {
            seen.push(next);
            tier = next;
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(tier, Tier::Challenger);
        assert!(tier.next().is_none());
    }

    #[test]
    fn divisions_stop_at_master() {
        assert!(Tier::Diamond.has_divisions());
        assert!(!Tier::Master.has_divisions());
        assert!(!Tier::Challenger.has_divisions());
    }

    #[test]
    fn rank_label_formats() {
        let rank = RankState {
            tier: Tier::Gold,
            division: Some(Division::II),
            ..Default::default()
        };
        assert_eq!(rank.label(), "Gold II");

        let master = RankState {
            tier: Tier::Master,
            division: None,
            ..Default::default()
        };
        assert_eq!(master.label(), "Master");
    }

    #[test]
    fn focus_serializes_with_display_names() {
        let json = serde_json::to_string(&FocusArea::CutCalories).unwrap();
        assert_eq!(json, "\"Cut Calories\"");
    }

    #[test]
    fn submission_scoring_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut sub = LogSubmission::new(date);
        assert!(!sub.scores_match());
        sub.steps = Some(4000);
        assert!(!sub.scores_match());
        sub.calories = Some(1800);
        assert!(sub.scores_match());
    }
}
