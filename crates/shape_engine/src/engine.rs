//! The command layer: every state mutation goes through [`Engine`].
//!
//! The engine owns the snapshot, the scoring table and a seedable RNG for
//! flavor text. Callers supply the clock on every command so behavior is
//! fully deterministic under test. Persistence is not the engine's concern;
//! the caller loads a snapshot, runs commands, and saves what comes back.

use crate::{analytics, badges, grace, ladder, mastery, quests, scoring, status};
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shape_common::backup::{validate_backup, BackupFile};
use shape_common::constants::{
    theme_by_id, FaithQuote, ScoringConfig, FAITH_QUOTES, LOADING_TIPS, WHY_TEMPLATES,
};
use shape_common::error::{PolicyError, ShapeError};
use shape_common::state::GameState;
use shape_common::types::{
    ActivityEntry, ActivityKind, CustomQuest, DailyLog, DayStatus, FocusArea, LogSubmission,
    MatchResult, Ping, Quest, Sex, SplitHistoryEntry, SplitState, TintOverride, UserProfile,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Partial settings update. `None` fields leave the profile untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub calorie_target: Option<u32>,
    pub sleep_target_hours: Option<f64>,
    pub target_steps: Option<u32>,
    pub target_weight: Option<f64>,
    pub target_date: Option<NaiveDate>,
    pub promotion_mode_enabled: Option<bool>,
    pub show_faith_quotes: Option<bool>,
    pub show_faith_quests: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub reset_rank_on_split: Option<bool>,
    pub tint_override: Option<TintOverride>,
}

/// Everything collected at onboarding.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardParams {
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    pub start_weight: f64,
    pub target_weight: f64,
    pub target_date: NaiveDate,
    pub calorie_target: u32,
    pub sleep_target_hours: f64,
    pub target_steps: u32,
    pub show_faith_quests: bool,
}

/// What one submission did, for the caller to present.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub status: DayStatus,
    pub result: Option<MatchResult>,
    pub lp_delta: i32,
    pub coach_line: Option<String>,
    pub promotions: Vec<String>,
    pub demotions: Vec<String>,
    pub unlocked_badges: Vec<String>,
    pub completed_quests: Vec<Quest>,
    pub recap_due: bool,
}

pub struct Engine {
    state: GameState,
    scoring: ScoringConfig,
    rng: StdRng,
}

impl Engine {
    pub fn new(state: GameState) -> Self {
        Self::with_seed(state, rand::random())
    }

    /// Deterministic flavor text under a fixed seed; used by tests.
    pub fn with_seed(state: GameState, seed: u64) -> Self {
        Self {
            state,
            scoring: ScoringConfig::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    fn profile(&self) -> Result<&UserProfile, PolicyError> {
        self.state.profile.as_ref().ok_or(PolicyError::NotOnboarded)
    }

    // -----------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------

    /// Create the profile and arm the first split. Fails on nonsense input;
    /// a second onboarding replaces the profile but keeps history.
    pub fn onboard(&mut self, params: OnboardParams, now: DateTime<Utc>) -> Result<(), ShapeError> {
        let today = now.date_naive();
        if params.name.trim().is_empty() {
            return Err(ShapeError::Validation("name must not be empty".into()));
        }
        if !(10..=100).contains(&params.age) {
            return Err(ShapeError::Validation("age must be 10-100".into()));
        }
        if params.height_cm <= 0.0 || params.start_weight <= 0.0 || params.target_weight <= 0.0 {
            return Err(ShapeError::Validation(
                "height and weights must be positive".into(),
            ));
        }
        if params.target_date <= today {
            return Err(ShapeError::Validation(
                "target date must be in the future".into(),
            ));
        }
        if params.calorie_target == 0 {
            return Err(ShapeError::Validation("calorie target required".into()));
        }
        if !(0.0..=24.0).contains(&params.sleep_target_hours) {
            return Err(ShapeError::Validation("sleep target must be 0-24h".into()));
        }

        let bmr = bmr_mifflin_st_jeor(
            params.sex,
            params.start_weight,
            params.height_cm,
            params.age,
        );

        self.state.profile = Some(UserProfile {
            name: params.name.trim().to_string(),
            sex: params.sex,
            age: params.age,
            height: params.height_cm,
            start_weight: params.start_weight,
            current_weight: params.start_weight,
            target_weight: params.target_weight,
            target_date: params.target_date,
            target_steps: params.target_steps,
            calorie_target: params.calorie_target,
            sleep_target_hours: params.sleep_target_hours,
            created_at: today,
            bmr,
            coins: 0,
            show_faith_quotes: params.show_faith_quests,
            show_faith_quests: params.show_faith_quests,
            promotion_mode_enabled: true,
            season_theme: "Discipline".to_string(),
            sound_enabled: true,
            reset_rank_on_split: false,
            auto_tint: true,
            tint_override: TintOverride::Auto,
            current_focus: FocusArea::Balanced,
            current_theme_id: "default".to_string(),
            unlocked_theme_ids: vec!["default".to_string()],
            custom_quests: Vec::new(),
        });
        self.state.has_onboarded = true;
        self.state.split = SplitState::starting("Season of Discipline", now);
        grace::roll_week(&mut self.state, today);

        let profile = self.state.profile.as_ref().unwrap();
        quests::generate(&mut self.state.quests, profile, today);
        info!(name = %profile.name, bmr, "profile created");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Daily logging
    // -----------------------------------------------------------------

    /// Merge a submission into the day's log and run the full pipeline:
    /// scoring, ladder, mastery, badges, quests, rewards.
    pub fn submit_log(
        &mut self,
        sub: &LogSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, ShapeError> {
        self.profile()?;
        let today = now.date_naive();
        if sub.date > today {
            return Err(ShapeError::Validation(
                "cannot log for a future date".into(),
            ));
        }

        grace::roll_week(&mut self.state, today);

        let prior_log = self.state.logs.get(&sub.date).cloned();

        // Overlay the submission; absent fields never erase stored values.
        let log = self
            .state
            .logs
            .entry(sub.date)
            .or_insert_with(|| DailyLog::empty(sub.date));
        if let Some(w) = sub.weight {
            log.weight = Some(w);
        }
        if let Some(c) = sub.calories {
            log.calories = Some(c);
            if log.first_calorie_time.is_none() {
                log.first_calorie_time = Some(now.time());
            }
            log.last_calorie_time = Some(now.time());
        }
        if let Some(s) = sub.steps {
            log.steps = Some(s);
        }
        if let Some(h) = sub.sleep_hours {
            log.sleep_hours = Some(h);
        }
        if let Some(q) = sub.sleep_quality {
            log.sleep_quality = Some(q);
        }
        if let Some(n) = &sub.notes {
            log.notes = Some(n.clone());
        }
        if let Some(r) = &sub.reflection {
            log.reflection = Some(r.clone());
        }
        if let Some(tag) = sub.life_event_tag {
            log.life_event_tag = Some(tag);
        }

        if let Some(w) = sub.weight {
            self.state.profile.as_mut().unwrap().current_weight = w;
        }

        let profile = self.state.profile.as_ref().unwrap().clone();
        let log = self.state.logs.get_mut(&sub.date).unwrap();

        // Coach line once per day, only for today's log.
        if log.coach_line.is_none() && sub.date == today {
            log.coach_line = Some(scoring::coach_line(
                &mut self.rng,
                log,
                &profile,
                &self.scoring,
            ));
        }

        let mut outcome = SubmitOutcome {
            status: status::day_status(Some(log), &profile, &self.scoring),
            result: log.match_result,
            lp_delta: 0,
            coach_line: log.coach_line.clone(),
            promotions: Vec::new(),
            demotions: Vec::new(),
            unlocked_badges: Vec::new(),
            completed_quests: Vec::new(),
            recap_due: false,
        };

        // Steps/sleep-only updates never move LP; the last verdict stands.
        if sub.scores_match() {
            let verdict = scoring::score_day(log, &profile, &self.scoring, self.state.rank.lp);
            let first_scoring = log.match_result.is_none();
            let prior = log.lp_change.unwrap_or(0);
            log.match_result = Some(verdict.result);
            log.lp_change = Some(verdict.lp_delta);
            outcome.result = Some(verdict.result);
            outcome.lp_delta = verdict.lp_delta;

            // Re-submissions settle the day at its latest verdict instead of
            // stacking deltas.
            let adjustment = verdict.lp_delta - prior;
            if adjustment != 0 {
                let moved = ladder::apply_delta(
                    &mut self.state.rank,
                    adjustment,
                    sub.date,
                    &verdict.result.to_string(),
                    now,
                );
                self.record_rank_moves(&moved, sub.date, now);
                outcome.promotions.extend(moved.promotions);
                outcome.demotions.extend(moved.demotions);
            }
            if first_scoring {
                ladder::update_streak(&mut self.state.rank, verdict.result);
            }
            debug!(date = %sub.date, result = %verdict.result, lp = verdict.lp_delta, "day scored");
        }

        // Mastery re-reads the merged log, crediting only what this
        // submission newly earned; re-submitting the same metrics never
        // recounts them.
        let merged = self.state.logs.get(&sub.date).unwrap().clone();
        self.state.mastery = mastery::settle(
            &self.state.mastery,
            prior_log.as_ref(),
            &merged,
            &profile,
        );

        self.state.activity.insert(
            0,
            ActivityEntry {
                id: Uuid::new_v4().to_string(),
                date: sub.date,
                timestamp: now,
                kind: ActivityKind::Log,
                message: format!("Logged {}", sub.date),
                value: None,
            },
        );

        // Quests before badges so the collector badge sees fresh completions.
        quests::generate(&mut self.state.quests, &profile, today);
        let completed = quests::evaluate(
            &mut self.state.quests,
            &self.state.logs,
            &profile,
            &self.scoring,
            today,
            now,
        );
        for quest in &completed {
            self.credit_quest(quest, today, now, &mut outcome);
        }
        outcome.completed_quests = completed;

        outcome.unlocked_badges = self.run_badges(now);

        let log = self.state.logs.get(&sub.date).unwrap();
        outcome.recap_due = sub.date == today && log.match_result.is_some() && !log.recap_shown;
        Ok(outcome)
    }

    fn credit_quest(
        &mut self,
        quest: &Quest,
        today: NaiveDate,
        now: DateTime<Utc>,
        outcome: &mut SubmitOutcome,
    ) {
        if quest.reward_coins > 0 {
            self.state.profile.as_mut().unwrap().coins += quest.reward_coins;
        }
        if quest.reward_lp != 0 {
            let moved = ladder::apply_delta(
                &mut self.state.rank,
                quest.reward_lp,
                today,
                &format!("Quest: {}", quest.title),
                now,
            );
            self.record_rank_moves(&moved, today, now);
            outcome.promotions.extend(moved.promotions);
            outcome.demotions.extend(moved.demotions);
        }
        self.state.activity.insert(
            0,
            ActivityEntry {
                id: format!("quest-{}", quest.id),
                date: today,
                timestamp: now,
                kind: ActivityKind::QuestComplete,
                message: format!("Quest complete: {}", quest.title),
                value: Some(format!("+{} LP, +{} coins", quest.reward_lp, quest.reward_coins)),
            },
        );
        info!(quest = %quest.title, "quest completed");
    }

    fn record_rank_moves(&mut self, moved: &ladder::LedgerOutcome, date: NaiveDate, now: DateTime<Utc>) {
        for label in &moved.promotions {
            self.state.activity.insert(
                0,
                ActivityEntry {
                    id: Uuid::new_v4().to_string(),
                    date,
                    timestamp: now,
                    kind: ActivityKind::RankUp,
                    message: format!("Promoted to {label}"),
                    value: None,
                },
            );
        }
        for label in &moved.demotions {
            self.state.activity.insert(
                0,
                ActivityEntry {
                    id: Uuid::new_v4().to_string(),
                    date,
                    timestamp: now,
                    kind: ActivityKind::RankDown,
                    message: format!("Demoted to {label}"),
                    value: None,
                },
            );
        }
    }

    fn run_badges(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let profile = self.state.profile.as_ref().unwrap();
        let ctx = badges::BadgeContext {
            logs: &self.state.logs,
            profile,
            quests: &self.state.quests,
            rank: &self.state.rank,
            activity: &self.state.activity,
            scoring: &self.scoring,
        };
        let (updated, unlocked) = badges::evaluate(&self.state.badges, &ctx, now);
        self.state.badges = updated;

        let names: Vec<String> = unlocked.iter().map(|b| b.name.clone()).collect();
        for badge in unlocked {
            self.state.activity.insert(
                0,
                ActivityEntry {
                    id: format!("badge-{}", badge.id),
                    date: now.date_naive(),
                    timestamp: now,
                    kind: ActivityKind::BadgeUnlock,
                    message: format!("Unlocked {}", badge.name),
                    value: None,
                },
            );
        }
        names
    }

    // -----------------------------------------------------------------
    // Grace, plan, spending
    // -----------------------------------------------------------------

    /// Spend coins to soften an already-logged day, then re-run quests and
    /// badges against the rewritten verdict. Mastery is not re-awarded.
    pub fn use_grace_day(
        &mut self,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), ShapeError> {
        grace::use_grace_day(&mut self.state, &self.scoring, date, now)?;
        let profile = self.state.profile.as_ref().unwrap().clone();
        quests::evaluate(
            &mut self.state.quests,
            &self.state.logs,
            &profile,
            &self.scoring,
            now.date_naive(),
            now,
        );
        self.run_badges(now);
        Ok(())
    }

    pub fn set_weekly_plan(
        &mut self,
        focus: FocusArea,
        promise: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ShapeError> {
        grace::set_weekly_plan(&mut self.state, focus, promise, now)?;
        Ok(())
    }

    pub fn buy_theme(&mut self, theme_id: &str) -> Result<(), ShapeError> {
        let theme = theme_by_id(theme_id)
            .ok_or_else(|| PolicyError::UnknownTheme(theme_id.to_string()))?;
        let profile = self.profile()?;
        if profile.unlocked_theme_ids.iter().any(|id| id == theme.id) {
            return Err(PolicyError::ThemeAlreadyOwned(theme_id.to_string()).into());
        }
        if profile.coins < theme.cost {
            return Err(PolicyError::InsufficientCoins {
                needed: theme.cost,
                have: profile.coins,
            }
            .into());
        }

        let profile = self.state.profile.as_mut().unwrap();
        profile.coins -= theme.cost;
        profile.unlocked_theme_ids.push(theme.id.to_string());
        profile.current_theme_id = theme.id.to_string();
        info!(theme = theme.id, "theme purchased");
        Ok(())
    }

    /// Switching focus is free; it reshapes reward boosts from the next
    /// quest generation onward. Existing instances keep their rewards.
    pub fn set_focus(&mut self, focus: FocusArea) -> Result<(), ShapeError> {
        self.profile()?;
        self.state.profile.as_mut().unwrap().current_focus = focus;
        Ok(())
    }

    /// Apply a partial settings update. Target changes take effect from the
    /// next classification; history is never rescored.
    pub fn update_profile(
        &mut self,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ShapeError> {
        self.profile()?;
        if update.calorie_target == Some(0) {
            return Err(ShapeError::Validation("calorie target required".into()));
        }
        if let Some(h) = update.sleep_target_hours {
            if !(0.0..=24.0).contains(&h) {
                return Err(ShapeError::Validation("sleep target must be 0-24h".into()));
            }
        }
        if let Some(w) = update.target_weight {
            if w <= 0.0 {
                return Err(ShapeError::Validation("target weight must be positive".into()));
            }
        }
        if let Some(date) = update.target_date {
            if date <= now.date_naive() {
                return Err(ShapeError::Validation(
                    "target date must be in the future".into(),
                ));
            }
        }

        let profile = self.state.profile.as_mut().unwrap();
        if let Some(v) = update.calorie_target {
            profile.calorie_target = v;
        }
        if let Some(v) = update.sleep_target_hours {
            profile.sleep_target_hours = v;
        }
        if let Some(v) = update.target_steps {
            profile.target_steps = v;
        }
        if let Some(v) = update.target_weight {
            profile.target_weight = v;
        }
        if let Some(v) = update.target_date {
            profile.target_date = v;
        }
        if let Some(v) = update.promotion_mode_enabled {
            profile.promotion_mode_enabled = v;
        }
        if let Some(v) = update.show_faith_quotes {
            profile.show_faith_quotes = v;
        }
        if let Some(v) = update.show_faith_quests {
            profile.show_faith_quests = v;
        }
        if let Some(v) = update.sound_enabled {
            profile.sound_enabled = v;
        }
        if let Some(v) = update.reset_rank_on_split {
            profile.reset_rank_on_split = v;
        }
        if let Some(v) = update.tint_override {
            profile.tint_override = v;
        }
        Ok(())
    }

    pub fn add_custom_quest(&mut self, custom: CustomQuest) -> Result<(), ShapeError> {
        self.profile()?;
        if custom.title.trim().is_empty() {
            return Err(ShapeError::Validation("quest title required".into()));
        }
        if custom.target_value == 0 {
            return Err(ShapeError::Validation("quest target must be positive".into()));
        }
        self.state.profile.as_mut().unwrap().custom_quests.push(custom);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Splits
    // -----------------------------------------------------------------

    /// Archive the current split and start a new eight-week window. Lifetime
    /// totals always survive; visible rank resets only if the profile says so.
    pub fn start_new_split(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), ShapeError> {
        let profile = self.profile()?;
        let reset_rank = profile.reset_rank_on_split;

        let old = &self.state.split;
        let badges_earned = self
            .state
            .badges
            .iter()
            .filter(|b| {
                b.unlocked_at
                    .map_or(false, |t| t >= old.start_date && t <= now)
            })
            .count() as u32;
        let archived = SplitHistoryEntry {
            name: old.name.clone(),
            start_date: old.start_date,
            end_date: now,
            final_lp: self.state.rank.total_lp,
            final_rank: self.state.rank.label(),
            badges_earned,
        };

        let mut history = old.history.clone();
        history.push(archived);
        let mut next = SplitState::starting(name, now);
        next.history = history;
        self.state.split = next;

        if reset_rank {
            let rank = &mut self.state.rank;
            rank.tier = shape_common::types::Tier::Iron;
            rank.division = Some(shape_common::types::Division::IV);
            rank.lp = 0;
            rank.streak = 0;
            rank.last_updated = now;
        }
        info!(split = name, "new split started");
        Ok(())
    }

    pub fn mark_recap_shown(&mut self, date: NaiveDate) -> Result<(), ShapeError> {
        let log = self
            .state
            .logs
            .get_mut(&date)
            .ok_or(PolicyError::NoLogForDate(date))?;
        log.recap_shown = true;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Backup / reset
    // -----------------------------------------------------------------

    pub fn export_backup(&self, now: DateTime<Utc>) -> BackupFile {
        BackupFile::export(&self.state, now)
    }

    /// Validate and restore a backup payload. All-or-nothing: a rejected
    /// payload leaves the current state untouched.
    pub fn restore_backup(&mut self, raw: &serde_json::Value) -> Result<(), ShapeError> {
        let backup = validate_backup(raw)?;
        self.state = backup.data;
        self.state.normalize();
        info!("backup restored");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = GameState::default();
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        match self.state.profile.as_ref() {
            Some(profile) => {
                status::day_status(self.state.logs.get(&date), profile, &self.scoring)
            }
            None => DayStatus::Gray,
        }
    }

    pub fn derived(&self, today: NaiveDate) -> analytics::Derived {
        analytics::derive(&self.state, today)
    }

    pub fn pings(&self, now: DateTime<Utc>) -> Vec<Ping> {
        analytics::pings(&self.state, now)
    }

    pub fn loading_tip(&mut self) -> &'static str {
        LOADING_TIPS[self.rng.gen_range(0..LOADING_TIPS.len())]
    }

    pub fn why_line(&mut self) -> &'static str {
        WHY_TEMPLATES[self.rng.gen_range(0..WHY_TEMPLATES.len())]
    }

    /// Scripture rotation, only when the profile opts in.
    pub fn faith_quote(&mut self) -> Option<&'static FaithQuote> {
        if self.state.profile.as_ref().map_or(false, |p| p.show_faith_quotes) {
            Some(&FAITH_QUOTES[self.rng.gen_range(0..FAITH_QUOTES.len())])
        } else {
            None
        }
    }
}

/// Mifflin-St Jeor basal metabolic rate.
pub fn bmr_mifflin_st_jeor(sex: Sex, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::loss_profile;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
            + chrono::Duration::days(i64::from(day) - 1)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn params() -> OnboardParams {
        OnboardParams {
            name: "Aril".into(),
            sex: Sex::Male,
            age: 30,
            height_cm: 180.0,
            start_weight: 90.0,
            target_weight: 80.0,
            target_date: d(1) + chrono::Duration::days(60),
            calorie_target: 2000,
            sleep_target_hours: 8.0,
            target_steps: 8000,
            show_faith_quests: true,
        }
    }

    fn onboarded_engine() -> Engine {
        let mut engine = Engine::with_seed(GameState::default(), 7);
        engine.onboard(params(), at(1, 8)).unwrap();
        engine
    }

    #[test]
    fn onboarding_computes_bmr_and_seeds_quests() {
        let engine = onboarded_engine();
        let profile = engine.state().profile.as_ref().unwrap();
        // 10*90 + 6.25*180 - 5*30 + 5 = 1880
        assert!((profile.bmr - 1880.0).abs() < f64::EPSILON);
        assert!(engine.state().has_onboarded);
        assert!(!engine.state().quests.is_empty());
    }

    #[test]
    fn onboarding_rejects_bad_input() {
        let mut engine = Engine::with_seed(GameState::default(), 7);
        let mut bad = params();
        bad.name = "  ".into();
        assert!(engine.onboard(bad, at(1, 8)).is_err());

        let mut past = params();
        past.target_date = d(1) - chrono::Duration::days(1);
        assert!(engine.onboard(past, at(1, 8)).is_err());
        assert!(!engine.state().has_onboarded);
    }

    #[test]
    fn perfect_day_moves_lp_and_completes_quests() {
        let mut engine = onboarded_engine();
        let mut sub = LogSubmission::new(d(2));
        sub.calories = Some(1800);
        sub.weight = Some(89.8);
        sub.sleep_hours = Some(8.5);

        let outcome = engine.submit_log(&sub, at(2, 9)).unwrap();
        assert_eq!(outcome.result, Some(MatchResult::Victory));
        assert_eq!(outcome.lp_delta, 12);
        assert!(!outcome.completed_quests.is_empty());
        assert!(outcome.recap_due);

        // Quest coins credited.
        assert!(engine.state().profile.as_ref().unwrap().coins > 0);
        // Ledger got the day plus quest lines.
        assert!(engine.state().rank.history.len() > 1);
        assert_eq!(engine.state().rank.streak, 1);
    }

    #[test]
    fn steps_only_update_never_moves_lp() {
        let mut engine = onboarded_engine();
        let mut sub = LogSubmission::new(d(2));
        sub.steps = Some(9000);

        let before = engine.state().rank.lp;
        let outcome = engine.submit_log(&sub, at(2, 9)).unwrap();
        assert_eq!(outcome.result, None);
        let after = engine.state().rank.lp;
        // Step quests may still pay out, but the day itself scored nothing.
        assert!(engine.state().logs[&d(2)].match_result.is_none());
        assert!(after >= before);
    }

    #[test]
    fn resubmission_settles_at_latest_verdict() {
        let mut engine = onboarded_engine();
        let mut first = LogSubmission::new(d(2));
        first.calories = Some(2600); // over target, no weight: Defeat -8
        engine.submit_log(&first, at(2, 9)).unwrap();

        let mut second = LogSubmission::new(d(2));
        second.calories = Some(1800);
        second.weight = Some(89.8);
        engine.submit_log(&second, at(2, 20)).unwrap();

        let log = &engine.state().logs[&d(2)];
        assert_eq!(log.match_result, Some(MatchResult::Victory));
        assert_eq!(log.lp_change, Some(12));

        // The day contributes -8 then a +20 correction, never -8 and +12
        // stacked on top of each other. Every ledger line still adds up.
        let day_lines: i32 = engine
            .state()
            .rank
            .history
            .iter()
            .filter(|h| !h.reason.starts_with("Quest:"))
            .map(|h| h.lp_change)
            .sum();
        assert_eq!(day_lines, 12);
        let history_sum: i64 = engine
            .state()
            .rank
            .history
            .iter()
            .map(|h| h.lp_change as i64)
            .sum();
        assert_eq!(engine.state().rank.total_lp, history_sum);
    }

    #[test]
    fn mastery_reads_the_merged_log_without_recounting() {
        let mut engine = onboarded_engine();
        let mut first = LogSubmission::new(d(2));
        first.calories = Some(1800);
        engine.submit_log(&first, at(2, 9)).unwrap();
        let after_first = engine.state().mastery;
        assert_eq!(after_first.calories, 15);

        // A notes-only edit re-evaluates the merged metrics and earns
        // nothing new.
        let mut note = LogSubmission::new(d(2));
        note.notes = Some("long day".into());
        engine.submit_log(&note, at(2, 20)).unwrap();
        assert_eq!(engine.state().mastery, after_first);

        // Adding sleep credits the sleep category only.
        let mut sleep = LogSubmission::new(d(2));
        sleep.sleep_hours = Some(8.5);
        engine.submit_log(&sleep, at(2, 22)).unwrap();
        let after_sleep = engine.state().mastery;
        assert_eq!(after_sleep.calories, after_first.calories);
        assert_eq!(after_sleep.sleep, after_first.sleep + 13);
    }

    #[test]
    fn coach_line_only_for_today() {
        let mut engine = onboarded_engine();
        let mut backfill = LogSubmission::new(d(2));
        backfill.calories = Some(1800);
        let outcome = engine.submit_log(&backfill, at(5, 9)).unwrap();
        assert!(outcome.coach_line.is_none());

        let mut todays = LogSubmission::new(d(5));
        todays.calories = Some(1800);
        let outcome = engine.submit_log(&todays, at(5, 9)).unwrap();
        assert!(outcome.coach_line.is_some());
    }

    #[test]
    fn future_dates_are_rejected() {
        let mut engine = onboarded_engine();
        let sub = LogSubmission::new(d(9));
        assert!(engine.submit_log(&sub, at(2, 9)).is_err());
    }

    #[test]
    fn grace_flow_through_the_engine() {
        let mut engine = onboarded_engine();
        engine.state.profile.as_mut().unwrap().coins = 20;

        let mut sub = LogSubmission::new(d(2));
        sub.calories = Some(3200);
        engine.submit_log(&sub, at(2, 9)).unwrap();
        assert_eq!(
            engine.state().logs[&d(2)].match_result,
            Some(MatchResult::Defeat)
        );

        engine.use_grace_day(d(2), at(2, 21)).unwrap();
        let log = &engine.state().logs[&d(2)];
        assert!(log.grace_used);
        assert_eq!(log.match_result, Some(MatchResult::Draw));
        assert_eq!(engine.state().profile.as_ref().unwrap().coins, 10);
    }

    #[test]
    fn theme_purchase_checks_wallet_and_ownership() {
        let mut engine = onboarded_engine();
        assert!(matches!(
            engine.buy_theme("silver"),
            Err(ShapeError::Policy(PolicyError::InsufficientCoins { .. }))
        ));

        engine.state.profile.as_mut().unwrap().coins = 60;
        engine.buy_theme("silver").unwrap();
        let profile = engine.state().profile.as_ref().unwrap();
        assert_eq!(profile.coins, 10);
        assert_eq!(profile.current_theme_id, "silver");

        assert!(matches!(
            engine.buy_theme("silver"),
            Err(ShapeError::Policy(PolicyError::ThemeAlreadyOwned(_)))
        ));
        assert!(matches!(
            engine.buy_theme("nope"),
            Err(ShapeError::Policy(PolicyError::UnknownTheme(_)))
        ));
    }

    #[test]
    fn split_archives_and_optionally_resets_rank() {
        let mut engine = onboarded_engine();
        engine.state.rank.total_lp = 340;
        engine.state.rank.lp = 40;
        engine.state.rank.tier = shape_common::types::Tier::Bronze;

        engine.start_new_split("Season of Focus", at(20, 10)).unwrap();
        let split = &engine.state().split;
        assert_eq!(split.name, "Season of Focus");
        assert_eq!(split.history.len(), 1);
        assert_eq!(split.history[0].final_lp, 340);
        // reset_rank_on_split defaults off: visible rank survives.
        assert_eq!(engine.state().rank.lp, 40);

        engine.state.profile.as_mut().unwrap().reset_rank_on_split = true;
        engine.start_new_split("Season of Grit", at(40, 10)).unwrap();
        assert_eq!(engine.state().rank.lp, 0);
        assert_eq!(engine.state().rank.tier, shape_common::types::Tier::Iron);
        // Lifetime total always survives.
        assert_eq!(engine.state().rank.total_lp, 340);
        assert_eq!(engine.state().split.history.len(), 2);
    }

    #[test]
    fn backup_round_trip_via_engine() {
        let mut engine = onboarded_engine();
        let mut sub = LogSubmission::new(d(2));
        sub.calories = Some(1800);
        engine.submit_log(&sub, at(2, 9)).unwrap();

        let backup = engine.export_backup(at(3, 9));
        let raw = serde_json::to_value(&backup).unwrap();

        let mut fresh = Engine::with_seed(GameState::default(), 1);
        fresh.restore_backup(&raw).unwrap();
        assert!(fresh.state().has_onboarded);
        assert_eq!(fresh.state().logs.len(), 1);
    }

    #[test]
    fn restore_rejects_foreign_payloads_untouched() {
        let mut engine = onboarded_engine();
        let before = engine.state().clone();
        let junk = serde_json::json!({"appName": "Other", "schemaVersion": 1, "data": {}});
        assert!(engine.restore_backup(&junk).is_err());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn faith_quote_respects_opt_out() {
        let mut engine = onboarded_engine();
        assert!(engine.faith_quote().is_some());
        engine.state.profile.as_mut().unwrap().show_faith_quotes = false;
        assert!(engine.faith_quote().is_none());
    }

    #[test]
    fn profile_update_applies_partial_changes_only() {
        let mut engine = onboarded_engine();
        let update = ProfileUpdate {
            calorie_target: Some(1850),
            promotion_mode_enabled: Some(false),
            ..Default::default()
        };
        engine.update_profile(update, at(3, 9)).unwrap();

        let profile = engine.state().profile.as_ref().unwrap();
        assert_eq!(profile.calorie_target, 1850);
        assert!(!profile.promotion_mode_enabled);
        // Untouched fields keep their values.
        assert_eq!(profile.target_steps, 8000);

        let bad = ProfileUpdate {
            sleep_target_hours: Some(30.0),
            ..Default::default()
        };
        assert!(engine.update_profile(bad, at(3, 9)).is_err());
    }

    #[test]
    fn commands_require_onboarding() {
        let mut engine = Engine::with_seed(GameState::default(), 7);
        let sub = LogSubmission::new(d(2));
        assert!(engine.submit_log(&sub, at(2, 9)).is_err());
        assert!(engine.set_focus(FocusArea::Consistency).is_err());
        assert!(engine.start_new_split("x", at(2, 9)).is_err());
    }

    #[test]
    fn loss_profile_matches_onboarding_shape() {
        // The shared fixture mirrors what onboard() produces.
        let fixture = loss_profile();
        let engine = onboarded_engine();
        let produced = engine.state().profile.as_ref().unwrap();
        assert_eq!(fixture.calorie_target, produced.calorie_target);
        assert_eq!(fixture.target_steps, produced.target_steps);
        assert!(produced.promotion_mode_enabled);
    }
}
