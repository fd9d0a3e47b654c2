//! Game engine for Summoner's Shape.
//!
//! Pure rules live in the leaf modules (status, scoring, mastery, badges,
//! quests, ladder, analytics, grace); [`engine::Engine`] composes them into
//! commands over a [`shape_common::state::GameState`] snapshot. Nothing in
//! this crate touches the filesystem or the wall clock.

pub mod analytics;
pub mod badges;
pub mod engine;
pub mod grace;
pub mod ladder;
pub mod mastery;
pub mod quests;
pub mod scoring;
pub mod status;

pub use engine::{Engine, OnboardParams, ProfileUpdate, SubmitOutcome};
pub use ladder::LedgerOutcome;
pub use scoring::MatchOutcome;

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::NaiveDate;
    use shape_common::types::{DailyLog, FocusArea, Sex, TintOverride, UserProfile};

    /// A 60-day cut from 90kg to 80kg starting 2026-01-01, mirroring what
    /// onboarding produces.
    pub fn loss_profile() -> UserProfile {
        UserProfile {
            name: "Aril".into(),
            sex: Sex::Male,
            age: 30,
            height: 180.0,
            start_weight: 90.0,
            current_weight: 90.0,
            target_weight: 80.0,
            target_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            target_steps: 8000,
            calorie_target: 2000,
            sleep_target_hours: 8.0,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            bmr: 1880.0,
            coins: 0,
            show_faith_quotes: true,
            show_faith_quests: true,
            promotion_mode_enabled: true,
            season_theme: "Discipline".into(),
            sound_enabled: true,
            reset_rank_on_split: false,
            auto_tint: true,
            tint_override: TintOverride::Auto,
            current_focus: FocusArea::Balanced,
            current_theme_id: "default".into(),
            unlocked_theme_ids: vec!["default".into()],
            custom_quests: Vec::new(),
        }
    }

    pub fn log_for(date: NaiveDate) -> DailyLog {
        DailyLog::empty(date)
    }
}
