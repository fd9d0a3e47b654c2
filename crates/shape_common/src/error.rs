//! Error taxonomy.
//!
//! Three families: validation failures (bad input, reported with a reason),
//! policy rejections (rule said no, state untouched) and fallible I/O at the
//! persistence/backup boundary. Corrupt saved state is not an error at all;
//! loading falls back to the default snapshot.

use thiserror::Error;

/// A rule refused the request. State is guaranteed unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("not enough coins: need {needed}, have {have}")]
    InsufficientCoins { needed: u32, have: u32 },

    #[error("weekly grace limit reached")]
    GraceLimitReached,

    #[error("grace already used on this day")]
    AlreadyGraced,

    #[error("no log exists for {0}")]
    NoLogForDate(chrono::NaiveDate),

    #[error("unknown theme '{0}'")]
    UnknownTheme(String),

    #[error("theme '{0}' already unlocked")]
    ThemeAlreadyOwned(String),

    #[error("no profile: complete onboarding first")]
    NotOnboarded,
}

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Backup(#[from] crate::backup::BackupError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
