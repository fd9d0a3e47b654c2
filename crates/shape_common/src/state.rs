//! The persisted game snapshot and its on-disk store.
//!
//! Persistence is a full-snapshot overwrite of one pretty-printed JSON file,
//! written atomically (temp file, fsync, rename) so a crash can never leave
//! a truncated save. A missing or unreadable file is treated as "no saved
//! state" and falls back to the default snapshot.

use crate::constants::BADGE_CATALOG;
use crate::error::ShapeError;
use crate::types::{
    ActivityEntry, Badge, DailyLog, GraceState, GroupState, MasteryState, Quest, RankState,
    SplitState, UserProfile, WeeklyPlan,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the game persists, in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub logs: BTreeMap<NaiveDate, DailyLog>,
    #[serde(default)]
    pub rank: RankState,
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
    #[serde(default)]
    pub has_onboarded: bool,
    #[serde(default)]
    pub mastery: MasteryState,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub split: SplitState,
    #[serde(default)]
    pub group: Option<GroupState>,
    #[serde(default)]
    pub weekly_plan: Option<WeeklyPlan>,
    #[serde(default)]
    pub grace: GraceState,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            profile: None,
            logs: BTreeMap::new(),
            rank: RankState::default(),
            quests: Vec::new(),
            activity: Vec::new(),
            has_onboarded: false,
            mastery: MasteryState::default(),
            badges: catalog_badges(),
            split: SplitState::default(),
            group: None,
            weekly_plan: None,
            grace: GraceState::default(),
        }
    }
}

impl GameState {
    /// Reconcile a loaded snapshot with the current badge catalog: stored
    /// progress and unlocks survive, names/descriptions/targets refresh,
    /// and badges added since the save appear with zero progress.
    pub fn normalize(&mut self) {
        let stored = std::mem::take(&mut self.badges);
        self.badges = BADGE_CATALOG
            .iter()
            .map(|def| {
                let existing = stored.iter().find(|b| b.id == def.id);
                Badge {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    icon: def.icon.to_string(),
                    unlocked_at: existing.and_then(|b| b.unlocked_at),
                    progress: existing.map(|b| b.progress).unwrap_or(0),
                    target: def.target,
                }
            })
            .collect();
    }
}

/// Fresh badge list from the static catalog.
pub fn catalog_badges() -> Vec<Badge> {
    BADGE_CATALOG
        .iter()
        .map(|def| Badge {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            unlocked_at: None,
            progress: 0,
            target: def.target,
        })
        .collect()
}

/// File-backed snapshot store.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("summoners-shape")
            .join("state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, falling back to the default state if the file is
    /// missing or unreadable. Corrupt state never fails hard.
    pub fn load(&self) -> GameState {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<GameState>(&raw) {
                Ok(mut state) => {
                    state.normalize();
                    debug!(path = %self.path.display(), "loaded game state");
                    state
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e,
                          "corrupt game state, starting fresh");
                    GameState::default()
                }
            },
            Err(_) => GameState::default(),
        }
    }

    /// Persist the full snapshot atomically.
    pub fn save(&self, state: &GameState) -> Result<(), ShapeError> {
        let content = serde_json::to_string_pretty(state)?;
        atomic_write(&self.path, content.as_bytes())?;
        Ok(())
    }

    /// Remove the saved snapshot (full reset).
    pub fn clear(&self) -> Result<(), ShapeError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Write via temp file + rename so readers never observe a partial file.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
