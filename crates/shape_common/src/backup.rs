//! Backup export/import interchange format.
//!
//! A backup is the full snapshot wrapped in a small envelope with an app
//! identifier and a schema version. Import is all-or-nothing: validation
//! failures leave the current state untouched, and a restore is a full
//! replacement, never a merge.

use crate::state::GameState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema version written by this build. Older versions are accepted and
/// pass through [`migrate`]; newer ones are rejected.
pub const CURRENT_SCHEMA_VERSION: u64 = 1;

/// Literal identifying backups produced by this application.
pub const APP_NAME: &str = "Summoner's Shape";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackupError {
    #[error("invalid backup payload: not a JSON object")]
    NotAnObject,

    #[error("file is not a Summoner's Shape backup")]
    WrongApp,

    #[error("missing or invalid schema version")]
    MissingSchemaVersion,

    #[error("backup is from a newer version (v{0}); update the app")]
    NewerSchema(u64),

    #[error("corrupt backup data: missing core fields")]
    MissingCoreFields,

    #[error("malformed backup contents: {0}")]
    Malformed(String),
}

/// Envelope around a full snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub schema_version: u64,
    pub exported_at: DateTime<Utc>,
    pub app_name: String,
    pub data: GameState,
}

impl BackupFile {
    pub fn export(state: &GameState, now: DateTime<Utc>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            exported_at: now,
            app_name: APP_NAME.to_string(),
            data: state.clone(),
        }
    }

    /// Suggested file name for an export.
    pub fn file_name(now: DateTime<Utc>) -> String {
        format!("summoners-shape-backup-{}.json", now.date_naive())
    }
}

/// Validate a raw JSON payload and deserialize it into a [`BackupFile`].
///
/// Checks run on the untyped value first so a clear, named error comes back
/// for each rejection class before serde gets involved.
pub fn validate_backup(raw: &serde_json::Value) -> Result<BackupFile, BackupError> {
    let obj = raw.as_object().ok_or(BackupError::NotAnObject)?;

    if obj.get("appName").and_then(|v| v.as_str()) != Some(APP_NAME) {
        return Err(BackupError::WrongApp);
    }

    let version = obj
        .get("schemaVersion")
        .and_then(|v| v.as_u64())
        .ok_or(BackupError::MissingSchemaVersion)?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(BackupError::NewerSchema(version));
    }

    let data = obj.get("data").ok_or(BackupError::MissingCoreFields)?;
    for field in ["profile", "logs", "rank"] {
        match data.get(field) {
            Some(v) if !v.is_null() => {}
            _ => return Err(BackupError::MissingCoreFields),
        }
    }

    let backup: BackupFile = serde_json::from_value(raw.clone())
        .map_err(|e| BackupError::Malformed(e.to_string()))?;
    Ok(migrate(backup))
}

/// Migration seam for older schema versions. Identity for v1.
fn migrate(backup: BackupFile) -> BackupFile {
    backup
}
